// Formatter: Convert AST back to siteswap notation
use crate::ast::*;
use siteswap_core::encoding::float_to_ss;
use siteswap_core::Hand;

/// Format a pattern tree as compact notation.
///
/// Whitespace is dropped except where removing it would change the parse,
/// e.g. `3 x` (two throws) against `3x` (one crossing throw).
pub fn format(ast: &PatternNode) -> String {
    let mut out = String::new();
    if let Some(delays) = &ast.delays {
        let delays: Vec<String> = delays.iter().map(|d| format_number(*d)).collect();
        out.push_str(&format!("{{{}}}", delays.join(",")));
    }
    let jugglers: Vec<String> = ast.jugglers.iter().map(format_juggler).collect();
    if ast.bracketed {
        out.push_str(&format!("<{}>", jugglers.join("|")));
    } else {
        out.push_str(&jugglers.join("|"));
    }
    out
}

fn format_juggler(juggler: &JugglerNode) -> String {
    let mut out = String::new();
    let mut prev: Option<&BeatNode> = None;
    for beat in &juggler.beats {
        let text = format_beat(beat);
        if prev.map_or(false, |p| needs_separator(p, &text)) {
            out.push(' ');
        }
        out.push_str(&text);
        prev = Some(beat);
    }
    if juggler.repeat_flipped {
        out.push('*');
    }
    out
}

/// True when `next` would be read as modifiers of the throw ending `prev`
fn needs_separator(prev: &BeatNode, next: &str) -> bool {
    let BeatNode::Async { group, .. } = prev else {
        return false;
    };
    if group.multiplex {
        return false;
    }
    let Some(last) = group.throws.last() else {
        return false;
    };
    match next.chars().next() {
        Some('p' | 'x') => true,
        Some(c) if c.is_ascii_uppercase() => last.pass && last.recipient.is_none(),
        _ => false,
    }
}

fn format_beat(beat: &BeatNode) -> String {
    match beat {
        BeatNode::Sync { left, right, bang, .. } => {
            let mut out = format!("({},{})", format_group(left), format_group(right));
            if *bang {
                out.push('!');
            }
            out
        }
        BeatNode::Async { hand, group, .. } => {
            let prefix = match hand {
                Some(Hand::Left) => "L",
                Some(Hand::Right) => "R",
                None => "",
            };
            format!("{}{}", prefix, format_group(group))
        }
    }
}

fn format_group(group: &GroupNode) -> String {
    let mut throws = String::new();
    for throw in &group.throws {
        let text = format_throw(throw);
        if !throws.is_empty() && text.starts_with(['p', 'x']) {
            throws.push(' ');
        }
        throws.push_str(&text);
    }
    if group.multiplex {
        format!("[{}]", throws)
    } else {
        throws
    }
}

fn format_throw(throw: &ThrowNode) -> String {
    let mut out = float_to_ss(throw.height).unwrap_or_else(|_| format_number(throw.height));
    if throw.pass {
        out.push('p');
    }
    if throw.x {
        out.push('x');
    }
    if let Some(recipient) = throw.recipient {
        out.push(recipient);
    }
    out
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn roundtrip(source: &str) -> String {
        format(&parse(source).unwrap())
    }

    #[test]
    fn test_format_strips_whitespace() {
        assert_eq!(roundtrip("b 0  1"), "b01");
        assert_eq!(roundtrip(" ( 4 , 4 ) ! "), "(4,4)!");
        assert_eq!(roundtrip("{0, 0.5} < 3.5p | 3.5px >"), "{0,0.5}<3.5p|3.5px>");
    }

    #[test]
    fn test_format_keeps_needed_spaces() {
        assert_eq!(roundtrip("3 x"), "3 x");
        assert_eq!(roundtrip("3 p"), "3 p");
        assert_eq!(roundtrip("<3p L3|3p3>"), "<3p L3|3p3>");
        assert_eq!(roundtrip("3pA L3"), "3pAL3");
        assert_eq!(roundtrip("[3 x]"), "[3 x]");
    }

    #[test]
    fn test_format_preserves_structure() {
        assert_eq!(roundtrip("[43]23"), "[43]23");
        assert_eq!(roundtrip("(6,4)(6x,4)*"), "(6,4)(6x,4)*");
        assert_eq!(roundtrip("<3pC33|3pA33|3pB33>"), "<3pC33|3pA33|3pB33>");
        assert_eq!(roundtrip("<3>"), "<3>");
        assert_eq!(roundtrip("R3L3"), "R3L3");
    }

    #[test]
    fn test_formatted_text_reparses_to_same_tree_shape() {
        for source in ["3 x 1", "x1", "[x3]1", "3p x", "[3 p]"] {
            let once = roundtrip(source);
            assert_eq!(roundtrip(&once), once, "{}", source);
        }
    }
}
