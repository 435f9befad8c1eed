//! 입력 파일 파서.
//!
//! 한 줄에 하나의 메트릭:
//!
//! ```text
//! <host> <key> <value>
//! <host> <key> <clock> <value>     (--with-timestamps)
//! ```
//!
//! 필드는 공백으로 구분하고, 공백을 포함한 값은 큰따옴표로 감싼다
//! (`\"`, `\\` 이스케이프 지원). host가 `-`이면 `--host` 값을 사용한다.
//! 빈 줄과 `#`으로 시작하는 줄은 건너뛴다.

use anyhow::{anyhow, bail, Context, Result};
use std::io::BufRead;
use zbxsend_core::models::metric::Metric;

/// 입력 형식 옵션
#[derive(Debug, Clone, Copy, Default)]
pub struct InputFormat<'a> {
    /// host 자리에 `-`가 올 때 대신 사용할 호스트명
    pub default_host: Option<&'a str>,
    /// 각 줄에 clock 필드 포함 여부
    pub with_timestamps: bool,
}

/// 입력 전체를 메트릭 목록으로 파싱
///
/// 잘못된 줄이 있으면 줄 번호(1부터)를 포함한 에러를 반환한다.
pub fn parse_input<R: BufRead>(reader: R, format: InputFormat<'_>) -> Result<Vec<Metric>> {
    let mut metrics = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("입력 읽기 실패 ({line_no}번째 줄)"))?;
        if let Some(metric) =
            parse_line(&line, format).with_context(|| format!("입력 {line_no}번째 줄 오류"))?
        {
            metrics.push(metric);
        }
    }

    Ok(metrics)
}

/// 한 줄 파싱 (빈 줄/주석은 `None`)
pub fn parse_line(line: &str, format: InputFormat<'_>) -> Result<Option<Metric>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let fields = tokenize(trimmed)?;
    let expected = if format.with_timestamps { 4 } else { 3 };
    if fields.len() != expected {
        bail!("필드 수 오류: {}개 (기대값 {expected}개)", fields.len());
    }

    let host = match fields[0].as_str() {
        "-" => format
            .default_host
            .ok_or_else(|| anyhow!("host가 '-'이지만 --host가 지정되지 않음"))?
            .to_string(),
        host => host.to_string(),
    };

    let metric = if format.with_timestamps {
        Metric::new(host, fields[1].as_str(), fields[3].as_str()).with_clock_str(&fields[2])?
    } else {
        Metric::new(host, fields[1].as_str(), fields[2].as_str())
    };
    Ok(Some(metric))
}

/// 공백 구분 + 큰따옴표 인용 필드 분리
fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let Some(&first) = chars.peek() else {
            break;
        };

        let mut field = String::new();
        if first == '"' {
            chars.next();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '"' => {
                        closed = true;
                        break;
                    }
                    '\\' => match chars.next() {
                        Some(escaped @ ('"' | '\\')) => field.push(escaped),
                        Some(other) => {
                            field.push('\\');
                            field.push(other);
                        }
                        None => field.push('\\'),
                    },
                    c => field.push(c),
                }
            }
            if !closed {
                bail!("닫는 큰따옴표 누락");
            }
            if chars.peek().is_some_and(|c| !c.is_whitespace()) {
                bail!("큰따옴표 뒤에 공백 없이 문자가 이어짐");
            }
        } else {
            while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                field.push(c);
            }
        }
        fields.push(field);
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn plain() -> InputFormat<'static> {
        InputFormat::default()
    }

    #[test]
    fn parses_simple_lines() {
        let input = "web01 cpu.load 0.75\nweb02 mem.free 1024\n";
        let metrics = parse_input(Cursor::new(input), plain()).unwrap();
        assert_eq!(
            metrics,
            vec![
                Metric::new("web01", "cpu.load", "0.75"),
                Metric::new("web02", "mem.free", "1024"),
            ]
        );
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        let input = "\n# 주석\n   \nweb01 k 1\n  # 들여쓴 주석\n";
        let metrics = parse_input(Cursor::new(input), plain()).unwrap();
        assert_eq!(metrics.len(), 1);
    }

    #[test]
    fn quoted_value_keeps_spaces_and_escapes() {
        let metric = parse_line(r#"web01 "log[/var/log/app]" "a \"quoted\" msg \\ end""#, plain())
            .unwrap()
            .unwrap();
        assert_eq!(metric.key(), "log[/var/log/app]");
        assert_eq!(metric.value(), r#"a "quoted" msg \ end"#);
    }

    #[test]
    fn empty_quoted_value() {
        let metric = parse_line(r#"h k """#, plain()).unwrap().unwrap();
        assert_eq!(metric.value(), "");
    }

    #[test]
    fn dash_host_uses_default() {
        let format = InputFormat {
            default_host: Some("fallback"),
            ..InputFormat::default()
        };
        let metric = parse_line("- k 1", format).unwrap().unwrap();
        assert_eq!(metric.host(), "fallback");

        assert!(parse_line("- k 1", plain()).is_err());
    }

    #[test]
    fn timestamps_column() {
        let format = InputFormat {
            with_timestamps: true,
            ..InputFormat::default()
        };
        let metric = parse_line("h k 1700000000 42", format).unwrap().unwrap();
        assert_eq!(metric.clock(), Some(1_700_000_000));
        assert_eq!(metric.value(), "42");

        assert!(parse_line("h k notaclock 42", format).is_err());
        assert!(parse_line("h k 42", format).is_err());
    }

    #[test]
    fn wrong_field_count_names_line() {
        let input = "h k 1\nh k\n";
        let err = parse_input(Cursor::new(input), plain()).unwrap_err();
        assert!(format!("{err:#}").contains("2번째 줄"));
    }

    #[test]
    fn unterminated_quote_is_error() {
        assert!(parse_line(r#"h k "open"#, plain()).is_err());
        assert!(parse_line(r#"h k "a"b"#, plain()).is_err());
    }
}
