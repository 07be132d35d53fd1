#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),  // /search <query> | <bare text>
    Suggest(String), // /suggest <text>
    News,            // /news
    Quota,           // /quota
    Help,            // /help
    Quit,            // /quit or /exit
    Empty,
    Unknown(String),
}

pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }
    if !trimmed.starts_with('/') {
        return Command::Search(trimmed.to_string());
    }
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let verb = parts.next().unwrap_or_default();
    let rest = parts.next().map(str::trim).unwrap_or_default().to_string();

    match verb {
        "/search" | "/s" => Command::Search(rest),
        "/suggest" => Command::Suggest(rest),
        "/news" => Command::News,
        "/quota" => Command::Quota,
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

pub const HELP: &str = "\
commands:
  <text>            search for <text>
  /search <query>   same as above
  /suggest <text>   autocomplete suggestions
  /news             top Hacker News stories
  /quota            today's usage per search credential
  /help             this message
  /quit             leave the shell
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_text_is_a_search() {
        assert_eq!(parse_command("  rust async  "), Command::Search("rust async".into()));
        assert_eq!(parse_command("/search   tokio"), Command::Search("tokio".into()));
        assert_eq!(parse_command("/search"), Command::Search(String::new()));
    }

    #[test]
    fn verbs_are_recognized() {
        assert_eq!(parse_command("/suggest ru"), Command::Suggest("ru".into()));
        assert_eq!(parse_command("/news"), Command::News);
        assert_eq!(parse_command("/quota"), Command::Quota);
        assert_eq!(parse_command("/exit"), Command::Quit);
        assert_eq!(parse_command(""), Command::Empty);
        assert_eq!(parse_command("/nope x"), Command::Unknown("/nope x".into()));
    }
}
