//! Minimal telnet input handling for a line based session.
//!
//! We never negotiate options, so the client stays in its default NVT line mode with
//! local echo. Whatever IAC sequences it sends anyway are stripped from the data.

const IAC: u8 = 255; // Interpret As Command
const WILL: u8 = 251;
const WONT: u8 = 252;
const DO: u8 = 253;
const DONT: u8 = 254;
const SB: u8 = 250; // Subnegotiation begin
const SE: u8 = 240; // Subnegotiation end

/// Longest input line we keep, bytes past it are dropped until the next newline
pub const MAX_LINE: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Data,
    /// After IAC
    Iac,
    /// After IAC WILL/WONT/DO/DONT, the option byte follows
    Option,
    /// Inside IAC SB ... IAC SE
    Sub,
    /// IAC inside a subnegotiation
    SubIac,
}

/// Splits a telnet byte stream into input lines.
#[derive(Debug, Default)]
pub struct TelnetLines {
    state: State,
    line: Vec<u8>,
}

impl TelnetLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte, returns a complete line when the byte ends one.
    pub fn push(&mut self, b: u8) -> Option<String> {
        match self.state {
            State::Data => match b {
                IAC => self.state = State::Iac,
                b'\n' => return Some(self.take_line()),
                b'\r' | 0 => {}
                _ => self.keep(b),
            },
            State::Iac => {
                self.state = match b {
                    IAC => {
                        // Escaped 0xFF in data
                        self.keep(IAC);
                        State::Data
                    }
                    WILL | WONT | DO | DONT => State::Option,
                    SB => State::Sub,
                    _ => State::Data,
                }
            }
            State::Option => self.state = State::Data,
            State::Sub => {
                if b == IAC {
                    self.state = State::SubIac;
                }
            }
            State::SubIac => {
                self.state = if b == SE { State::Data } else { State::Sub };
            }
        }
        None
    }

    fn keep(&mut self, b: u8) {
        if self.line.len() < MAX_LINE {
            self.line.push(b);
        }
    }

    fn take_line(&mut self) -> String {
        let bytes = std::mem::take(&mut self.line);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(input: &[u8]) -> Vec<String> {
        let mut t = TelnetLines::new();
        input.iter().filter_map(|b| t.push(*b)).collect()
    }

    #[test]
    fn splits_crlf_lines() {
        assert_eq!(lines(b"order\r\n2\r\n\r\nno newline"), vec!["order", "2", ""]);
    }

    #[test]
    fn strips_negotiation() {
        let mut input = vec![IAC, DO, 1, b'h', b'i', IAC, SB, 31, 0, 80, 0, 24, IAC, SE];
        input.extend_from_slice(b"!\r\n");
        assert_eq!(lines(&input), vec!["hi!"]);
    }

    #[test]
    fn long_lines_are_truncated() {
        let mut t = TelnetLines::new();
        for _ in 0..(8 << 20) {
            assert_eq!(t.push(b'a'), None);
        }
        assert_eq!(t.line.len(), MAX_LINE);

        let line = t.push(b'\n').unwrap();
        assert_eq!(line.len(), MAX_LINE);
        assert_eq!(lines(b"next\r\n"), vec!["next"]);
        assert_eq!(t.push(b'\n').unwrap(), "");
    }

    #[test]
    fn keeps_utf8() {
        assert_eq!(lines("s'il vous plaît\n".as_bytes()), vec!["s'il vous plaît"]);
    }
}
