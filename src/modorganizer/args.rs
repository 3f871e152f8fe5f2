use regex::Regex;
use std::sync::LazyLock;

static WRAPPED_ARGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"?(([^"]|\\")+)"?$"#).expect("static regex"));
static ARG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:[^ "]+|"[^"]+")+"#).expect("static regex"));
static QUOTED_ARG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"([^"]+)"$"#).expect("static regex"));

/// Quoted sections stay together and keep their inner quotes unless the
/// whole argument is quoted.
pub fn split_arguments(raw: &str) -> Vec<String> {
    let unwrapped = if raw.starts_with('"') && raw.ends_with('"') {
        WRAPPED_ARGS.replace(raw, "$1").into_owned()
    } else {
        raw.to_string()
    };
    let unescaped = unwrapped.replace("\\\"", "\"").replace("\\\\", "\\");

    ARG.find_iter(&unescaped)
        .map(|arg| QUOTED_ARG.replace(arg.as_str(), "$1").into_owned())
        .collect()
}

pub fn join_arguments(args: &[String]) -> String {
    let joined = args.join(" ");
    let escape_single = joined.contains('\'') && joined.contains('"');
    let mut out = String::with_capacity(joined.len());
    for c in joined.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' if escape_single => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}
