use std::borrow::Cow;

/// Keeps the first character of the local part and the whole domain:
/// `alice@example.com` becomes `a***@example.com`.
pub fn redact_email(input: &str) -> String {
    let trimmed = input.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{first}***@{domain}")
        }
        None if trimmed.is_empty() => String::new(),
        None => "***".to_string(),
    }
}

fn redact_after(text: String, marker: &str, stop: fn(char) -> bool) -> String {
    if !text.contains(marker) {
        return text;
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text.as_str();
    while let Some(idx) = rest.find(marker) {
        out.push_str(&rest[..idx + marker.len()]);
        rest = &rest[idx + marker.len()..];

        let mut consumed = 0;
        for ch in rest.chars() {
            if stop(ch) {
                break;
            }
            consumed += ch.len_utf8();
        }
        out.push_str("REDACTED");
        rest = &rest[consumed..];
    }
    out.push_str(rest);
    out
}

pub fn redact_secrets(input: &str) -> Cow<'_, str> {
    let mut value = input.to_string();

    for marker in ["password=", "\"password\":"] {
        value = redact_after(value, marker, |ch| {
            ch == '&' || ch == ';' || ch == ',' || ch == '}' || ch.is_whitespace()
        });
    }
    for header in ["Authorization: Bearer ", "authorization: Bearer "] {
        value = redact_after(value, header, |ch| ch == '\n' || ch == '\r');
    }

    if value == input {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(value)
    }
}
