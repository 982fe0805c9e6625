//! `{key}` 占位符填充
//!
//! 只扫描一遍模板，替换进来的值不会再被当作占位符展开；
//! 未知的键原样保留。

/// 用给定的键值填充模板
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };

        let key = &after[..end];
        match values.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_replaces_known_keys() {
        let html = fill("<td class='{class}'>{label}</td>", &[("class", "active"), ("label", "db")]);
        assert_eq!(html, "<td class='active'>db</td>");
    }

    #[test]
    fn test_fill_keeps_unknown_and_unclosed() {
        assert_eq!(fill("{missing} {x", &[("x", "1")]), "{missing} {x");
    }

    #[test]
    fn test_fill_does_not_expand_values() {
        assert_eq!(fill("{a}{b}", &[("a", "{b}"), ("b", "2")]), "{b}2");
    }
}
