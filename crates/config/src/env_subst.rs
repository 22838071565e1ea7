/// Replace `${VAR}` and `${VAR:-fallback}` placeholders in raw config text.
///
/// Unset variables without a fallback are left as-is so that parse errors
/// point at the placeholder rather than at an empty value.
pub fn substitute_env(input: &str) -> String {
    substitute_with(input, |name| std::env::var(name).ok())
}

fn substitute_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated placeholder, emit the remainder literally.
            out.push_str(&rest[start..]);
            return out;
        };

        let expr = &after[..end];
        let (name, fallback) = match expr.split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (expr, None),
        };

        match (name.is_empty(), lookup(name), fallback) {
            (false, Some(value), _) => out.push_str(&value),
            (false, None, Some(fallback)) => out.push_str(fallback),
            _ => {
                out.push_str("${");
                out.push_str(expr);
                out.push('}');
            },
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_env(name: &str) -> Option<String> {
        (name == "RECAP_TOKEN").then(|| "abc123".to_string())
    }

    #[test]
    fn substitutes_known_var() {
        assert_eq!(
            substitute_with("token = \"${RECAP_TOKEN}\"", fake_env),
            "token = \"abc123\""
        );
    }

    #[test]
    fn leaves_unknown_var() {
        assert_eq!(
            substitute_with("${RECAP_NONEXISTENT_XYZ}", fake_env),
            "${RECAP_NONEXISTENT_XYZ}"
        );
    }

    #[test]
    fn uses_fallback_for_unknown_var() {
        assert_eq!(
            substitute_with("model = \"${RECAP_MODEL:-gpt-4o-mini}\"", fake_env),
            "model = \"gpt-4o-mini\""
        );
        assert_eq!(substitute_with("${RECAP_TOKEN:-unused}", fake_env), "abc123");
    }

    #[test]
    fn unterminated_placeholder_is_literal() {
        assert_eq!(substitute_with("a ${RECAP_TOKEN", fake_env), "a ${RECAP_TOKEN");
    }

    #[test]
    #[allow(unsafe_code)]
    fn reads_process_environment() {
        unsafe { std::env::set_var("RECAP_SUBST_TEST_VAR", "hello") };
        assert_eq!(substitute_env("key=${RECAP_SUBST_TEST_VAR}"), "key=hello");
        unsafe { std::env::remove_var("RECAP_SUBST_TEST_VAR") };
    }
}
