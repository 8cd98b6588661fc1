//! Solver for the obfuscated reservation challenge.
//!
//! The challenge is a short script of the shape
//! `decode.call(this, '<message>'); function decode(message) { var offset = <expr>; ...
//! return String.fromCharCode((((char.charCodeAt(0) * position) + offset) % 77) + 48); }`.
//! Only the message, the offset expression and the two trailing constants matter.

use base64::{engine::general_purpose::STANDARD, Engine};

const DEFAULT_MODULUS: i64 = 77;
const DEFAULT_BASE: i64 = 48;

/// Decodes the challenge message. Returns `None` when the script cannot be understood.
pub fn solve(challenge: &str) -> Option<String> {
    let script: String = challenge.chars().filter(|&c| c != '\t' && c.is_ascii()).collect();

    let (_, rest) = script.split_once('\'')?;
    let (message, rest) = rest.split_once('\'')?;

    let (_, rest) = rest.split_once("offset")?;
    let (_, rest) = rest.split_once('=')?;
    let (expr, rest) = rest.split_once(';')?;
    let offset = eval(expr)?;

    let (modulus, base) = match rest.split_once("fromCharCode") {
        Some((_, tail)) => {
            let (modulus, tail) = number_after(tail, '%').unwrap_or((DEFAULT_MODULUS, tail));
            let (base, _) = number_after(tail, '+').unwrap_or((DEFAULT_BASE, tail));
            (modulus, base)
        }
        None => (DEFAULT_MODULUS, DEFAULT_BASE),
    };
    if modulus == 0 {
        return None;
    }

    let mut solution = String::with_capacity(message.len());
    for (position, byte) in message.bytes().enumerate() {
        let position = i64::try_from(position).ok()?;
        let code = i64::from(byte).checked_mul(position)?.checked_add(offset)? % modulus + base;
        // `fromCharCode` truncates to 16 bits.
        solution.push(char::from_u32(u32::from(code as u16))?);
    }

    log::debug!("challenge solved with offset {offset}");
    Some(solution)
}

/// Derives the CometD session ID from the base64 session token and the challenge solution.
pub fn session_id(token: &str, solution: &str) -> Option<String> {
    let decoded = STANDARD.decode(token.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let key: Vec<_> = solution.chars().map(u32::from).collect();
    if key.is_empty() {
        return None;
    }

    decoded.chars().zip(key.iter().cycle()).map(|(c, k)| char::from_u32(u32::from(c) ^ k)).collect()
}

/// Finds `marker` in `text` and parses the integer right after it.
fn number_after(text: &str, marker: char) -> Option<(i64, &str)> {
    let (_, tail) = text.split_once(marker)?;
    let tail = tail.trim_start();
    let end = tail.find(|c: char| !c.is_ascii_digit()).unwrap_or(tail.len());
    let number = tail[..end].parse().ok()?;
    Some((number, &tail[end..]))
}

/// Evaluates integer arithmetic with `+ - * /` and parentheses. Inexact division is rejected.
pub fn eval(expr: &str) -> Option<i64> {
    let mut parser = Parser { bytes: expr.as_bytes(), pos: 0 };
    let value = parser.expr()?;
    parser.skip_whitespace();
    (parser.pos == parser.bytes.len()).then_some(value)
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn skip_whitespace(&mut self) {
        while self.bytes.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.bytes.get(self.pos).copied()
    }

    fn expr(&mut self) -> Option<i64> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(b'+') => {
                    self.pos += 1;
                    value = value.checked_add(self.term()?)?;
                }
                Some(b'-') => {
                    self.pos += 1;
                    value = value.checked_sub(self.term()?)?;
                }
                _ => return Some(value),
            }
        }
    }

    fn term(&mut self) -> Option<i64> {
        let mut value = self.factor()?;
        loop {
            match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    value = value.checked_mul(self.factor()?)?;
                }
                Some(b'/') => {
                    self.pos += 1;
                    let divisor = self.factor()?;
                    if divisor == 0 || value % divisor != 0 {
                        return None;
                    }
                    value /= divisor;
                }
                _ => return Some(value),
            }
        }
    }

    fn factor(&mut self) -> Option<i64> {
        match self.peek()? {
            b'-' => {
                self.pos += 1;
                self.factor()?.checked_neg()
            }
            b'+' => {
                self.pos += 1;
                self.factor()
            }
            b'(' => {
                self.pos += 1;
                let value = self.expr()?;
                if self.peek()? != b')' {
                    return None;
                }
                self.pos += 1;
                Some(value)
            }
            b'0'..=b'9' => {
                let start = self.pos;
                while self.bytes.get(self.pos).is_some_and(u8::is_ascii_digit) {
                    self.pos += 1;
                }
                core::str::from_utf8(&self.bytes[start..self.pos]).ok()?.parse().ok()
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{eval, session_id, solve};

    fn script(message: &str, offset: &str, modulus: u32, base: u32) -> String {
        format!(
            "decode.call(this, '{message}'); function decode(message) {{var offset = {offset}; \
             if(\tthis.angular.isArray(\toffset\t)) console.log(\"Offset derived as: {{\", offset, \"}}\"); \
             return _.replace(\tmessage,/./g, function(char, position) {{\
             return String.fromCharCode((((char.charCodeAt(0)*position)+ offset ) % {modulus}) + {base});}});}}"
        )
    }

    #[test]
    fn arithmetic() {
        assert_eq!(eval("((10 * 3) * 91 + 64)"), Some(2794));
        assert_eq!(eval("-(4 - 6) * 3"), Some(6));
        assert_eq!(eval("8 / 2 - 1"), Some(3));
        assert_eq!(eval("7 / 2"), None);
        assert_eq!(eval("1 / 0"), None);
        assert_eq!(eval("(1 + 2"), None);
        assert_eq!(eval("1 + x"), None);
    }

    #[test]
    fn decode_message() {
        assert_eq!(solve(&script("abc", "((2 * 3) + 4)", 77, 48)).as_deref(), Some(":Of"));
        assert_eq!(solve(&script("AB", "(3*(4-1))", 50, 40)).as_deref(), Some("1A"));
        assert_eq!(solve("no challenge here"), None);
    }

    #[test]
    fn non_ascii_noise_is_dropped() {
        let noisy = script("abc", "((2 * 3) + 4)", 77, 48).replace("offset =", "offset\u{a0} =");
        assert_eq!(solve(&noisy).as_deref(), Some(":Of"));
    }

    #[test]
    fn xor_token_with_solution() {
        assert_eq!(session_id("aGVsbG8=", "  ").as_deref(), Some("HELLO"));
        assert_eq!(session_id("aGVsbG8=", ""), None);
        assert_eq!(session_id("not base64!", "key"), None);
    }
}
