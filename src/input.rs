use crossterm::event::{KeyCode, KeyModifiers};

use crate::model::request::EstimationRequest;

pub const DEFAULT_SHOTS: u32 = 1024;

/// Split a comma separated ticker field into uppercase symbols.
///
/// Empty entries are dropped; duplicates are kept in input order.
pub fn normalize_tickers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_ascii_uppercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Parse the shots field, falling back to [`DEFAULT_SHOTS`].
///
/// Reads the leading run of digits after optional whitespace, so `"512"`
/// and `"512 shots"` both give 512. Empty, non-numeric, zero, negative and
/// out-of-range input all give the default.
pub fn parse_shots(raw: &str) -> u32 {
    let trimmed = raw.trim_start();
    let digits = trimmed
        .strip_prefix('+')
        .unwrap_or(trimmed)
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>();
    match digits.parse::<u32>() {
        Ok(0) | Err(_) => DEFAULT_SHOTS,
        Ok(n) => n,
    }
}

/// Raw form values as the user typed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInput {
    pub tickers: String,
    pub period: String,
    pub use_quantum: bool,
    pub shots: String,
}

impl RunInput {
    pub fn normalize(&self) -> EstimationRequest {
        EstimationRequest {
            tickers: normalize_tickers(&self.tickers),
            period: self.period.trim().to_string(),
            use_quantum: self.use_quantum,
            shots: parse_shots(&self.shots),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Tickers,
    Period,
    Quantum,
    Shots,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Tickers,
        FormField::Period,
        FormField::Quantum,
        FormField::Shots,
    ];

    pub fn next(self) -> Self {
        match self {
            Self::Tickers => Self::Period,
            Self::Period => Self::Quantum,
            Self::Quantum => Self::Shots,
            Self::Shots => Self::Tickers,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Tickers => Self::Shots,
            Self::Period => Self::Tickers,
            Self::Quantum => Self::Period,
            Self::Shots => Self::Quantum,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Tickers => "Tickers",
            Self::Period => "Period",
            Self::Quantum => "Quantum",
            Self::Shots => "Shots",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormCommand {
    Quit,
    Run,
    NextField,
    PrevField,
    Insert(char),
    Backspace,
    ClearField,
    PeriodPrev,
    PeriodNext,
    ToggleQuantum,
}

pub fn parse_form_command(
    focus: FormField,
    key_code: &KeyCode,
    modifiers: KeyModifiers,
) -> Option<FormCommand> {
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match key_code {
            KeyCode::Char('c') | KeyCode::Char('q') => Some(FormCommand::Quit),
            KeyCode::Char('u') => Some(FormCommand::ClearField),
            KeyCode::Char('r') => Some(FormCommand::Run),
            _ => None,
        };
    }
    match key_code {
        KeyCode::Esc => Some(FormCommand::Quit),
        KeyCode::Enter => Some(FormCommand::Run),
        KeyCode::Tab | KeyCode::Down => Some(FormCommand::NextField),
        KeyCode::BackTab | KeyCode::Up => Some(FormCommand::PrevField),
        _ => match focus {
            FormField::Tickers | FormField::Shots => match key_code {
                KeyCode::Backspace => Some(FormCommand::Backspace),
                KeyCode::Char(c) if focus == FormField::Shots && !c.is_ascii_digit() => None,
                KeyCode::Char(c) => Some(FormCommand::Insert(*c)),
                _ => None,
            },
            FormField::Period => match key_code {
                KeyCode::Left | KeyCode::Char('h') => Some(FormCommand::PeriodPrev),
                KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
                    Some(FormCommand::PeriodNext)
                }
                _ => None,
            },
            FormField::Quantum => match key_code {
                KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => {
                    Some(FormCommand::ToggleQuantum)
                }
                KeyCode::Char(c) if c.eq_ignore_ascii_case(&'x') => {
                    Some(FormCommand::ToggleQuantum)
                }
                _ => None,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shots_reads_leading_digits() {
        assert_eq!(parse_shots("  256"), 256);
        assert_eq!(parse_shots("+64"), 64);
        assert_eq!(parse_shots("12.9"), 12);
    }

    #[test]
    fn shots_overflow_falls_back() {
        assert_eq!(parse_shots("99999999999"), DEFAULT_SHOTS);
        assert_eq!(parse_shots("-5"), DEFAULT_SHOTS);
    }

    #[test]
    fn field_cycle_wraps_both_ways() {
        for field in FormField::ALL {
            assert_eq!(field.next().prev(), field);
        }
        assert_eq!(FormField::Shots.next(), FormField::Tickers);
    }
}
