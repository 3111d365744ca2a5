use crate::value::Value;

pub fn format_path(segments: &[&str]) -> String {
    segments.join(".")
}

pub fn format_value(value: &Value) -> String {
    match value {
        Value::Str(s) if s.is_empty() => "\"\"".to_string(),
        other => other.to_string(),
    }
}

pub fn format_segments(segments: &[String]) -> String {
    if segments.is_empty() {
        "(root)".to_string()
    } else {
        segments.join(" > ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_paths_and_values() {
        assert_eq!(format_path(&["sub_1", "sub_2", "level"]), "sub_1.sub_2.level");
        assert_eq!(format_value(&Value::List(vec![Value::Int(1), Value::Int(2)])), "[1, 2]");
        assert_eq!(format_value(&Value::Str(String::new())), "\"\"");
        assert_eq!(format_value(&Value::Null), "-");
        assert_eq!(format_segments(&[]), "(root)");
        assert_eq!(
            format_segments(&["boba".to_string(), "make".to_string()]),
            "boba > make"
        );
    }
}
