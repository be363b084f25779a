use std::fmt;

/// A call-shaped template reference such as `${SendActivity_202664()}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateRef {
    pub name: String,
    /// The raw text between the parentheses.
    pub arguments: String,
}

impl TemplateRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: String::new(),
        }
    }
}

impl fmt::Display for TemplateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{{}({})}}", self.name, self.arguments)
    }
}

/// Finds every `${Name(...)}` reference in `text`, in order of appearance.
///
/// Expressions without a call (`${turn.activity.text}`) are not references.
pub fn extract_template_refs(text: &str) -> Vec<TemplateRef> {
    let mut refs = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        let candidate = &rest[start + 2..];
        match parse_call(candidate) {
            Some((found, consumed)) => {
                refs.push(found);
                rest = &candidate[consumed..];
            }
            None => rest = candidate,
        }
    }
    refs
}

/// The reference when `text` holds exactly one; literal text otherwise.
pub fn single_template_ref(text: &str) -> Option<TemplateRef> {
    let mut refs = extract_template_refs(text);
    if refs.len() == 1 { refs.pop() } else { None }
}

/// Parses `Name(args)}` and returns the reference plus the bytes consumed.
fn parse_call(input: &str) -> Option<(TemplateRef, usize)> {
    let name_len = input
        .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.' || c == '-'))
        .unwrap_or(input.len());
    if name_len == 0 || !input[name_len..].starts_with('(') {
        return None;
    }

    let args_start = name_len + 1;
    let mut depth = 1usize;
    let mut close = None;
    for (offset, c) in input[args_start..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(args_start + offset);
                    break;
                }
            }
            '}' => return None,
            _ => {}
        }
    }
    let close = close?;
    if !input[close + 1..].starts_with('}') {
        return None;
    }

    let found = TemplateRef {
        name: input[..name_len].to_string(),
        arguments: input[args_start..close].to_string(),
    };
    Some((found, close + 2))
}
