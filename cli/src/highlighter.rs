use nu_ansi_term::{Color, Style};
use reedline::StyledText;

use crate::lexer::{self, Class};

const fn color(class: Class) -> Color {
    match class {
        Class::Mnemonic => Color::Magenta,
        Class::Directive => Color::Yellow,
        Class::Label => Color::Blue,
        Class::LabelRef => Color::Blue,
        Class::Number => Color::Cyan,
        Class::Comment => Color::DarkGray,
        Class::Punctuation => Color::White,
        Class::Error => Color::Red,
    }
}

/// Syntax highlighting for assembly lines in the REPL.
pub struct Highlighter;

impl reedline::Highlighter for Highlighter {
    fn highlight(&self, line: &str, _: usize) -> StyledText {
        let mut output = StyledText::new();
        let plain = Style::new().fg(Color::White);
        let mut last = 0;

        for (span, class) in lexer::classify(line) {
            if span.start > last {
                output.push((plain, line[last..span.start].to_string()));
            }
            output.push((Style::new().fg(color(class)), line[span.clone()].to_string()));
            last = span.end;
        }
        if last < line.len() {
            output.push((plain, line[last..].to_string()));
        }

        output
    }
}
