use model::Color;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Prints `question` and reads one line of input. Returns `None` at end of input.
pub async fn ask<R>(input: &mut R, question: &str) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    {
        let mut stdout = std::io::stdout().lock();
        write!(stdout, "{question}")?;
        stdout.flush()?;
    }

    let mut line = String::new();
    if input.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}

/// Accepts `y` and `yes` in any case.
pub fn is_yes(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Converts color letters (e.g. `rbyg`) into the option positions the host expects (`0123`).
pub fn two_factor_sequence(colors: &str) -> Option<String> {
    let sequence: Option<String> = colors
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| Color::from_letter(c.to_ascii_lowercase()).map(|color| char::from(b'0' + color.index())))
        .collect();
    sequence.filter(|sequence| !sequence.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{ask, is_yes, two_factor_sequence};

    #[test]
    fn yes_answers() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("yeah"));
        assert!(!is_yes(""));
    }

    #[test]
    fn color_sequence() {
        assert_eq!(two_factor_sequence("rbyg").as_deref(), Some("0123"));
        assert_eq!(two_factor_sequence("Y R G B").as_deref(), Some("2031"));
        assert_eq!(two_factor_sequence("rbx"), None);
        assert_eq!(two_factor_sequence("  "), None);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn read_lines_until_eof() {
        let mut input: &[u8] = b"yes\n  rbyg  \n";
        assert_eq!(ask(&mut input, "").await.unwrap().as_deref(), Some("yes"));
        assert_eq!(ask(&mut input, "").await.unwrap().as_deref(), Some("rbyg"));
        assert_eq!(ask(&mut input, "").await.unwrap(), None);
    }
}
