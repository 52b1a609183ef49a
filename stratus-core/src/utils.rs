//! Shared string utilities for naming generated code.

/// Convert a string to PascalCase (e.g., "data_bucket" -> "DataBucket").
///
/// Separators are `_`, `-`, `.`, `:` and whitespace. Existing capitals
/// inside a word are kept.
pub fn to_pascal_case(s: &str) -> String {
    s.split(|c: char| c == '_' || c == '-' || c == '.' || c == ':' || c.is_whitespace())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}

/// Convert a string to snake_case (e.g., "DataBucket" -> "data_bucket").
///
/// Runs of capitals are treated as one word, so "EC2Instance" becomes
/// "ec2_instance" and "VPCGatewayAttachment" becomes "vpc_gateway_attachment".
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == '.' || c == ' ' {
            if !result.ends_with('_') && !result.is_empty() {
                result.push('_');
            }
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || (prev.is_ascii_digit() && next_lower)
                || (prev.is_uppercase() && next_lower);
            if boundary && !result.ends_with('_') {
                result.push('_');
            }
        }
        result.extend(c.to_lowercase());
    }
    result
}
