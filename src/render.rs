//! Terminal presentation of result pages, settings, and errors.

use crate::query::QueryContext;
use crate::results::{ResultPage, SearchResult};
use crate::session::DisplayFlags;
use colored::Colorize;
use unicode_width::UnicodeWidthChar;

const TITLE_WIDTH: usize = 70;
const MAX_CONTENT_WORDS: usize = 128;
const CONTENT_INDENT: &str = "     ";

/// Flip ANSI output globally. Called at startup and on the color toggle.
pub fn set_color(enabled: bool) {
    if enabled {
        colored::control::unset_override();
    } else {
        colored::control::set_override(false);
    }
}

fn content_width() -> usize {
    textwrap::termwidth().saturating_sub(CONTENT_INDENT.len()).max(20)
}

/// Print one page the way the prompt user reads it: numbered, titles
/// truncated, snippet wrapped, metadata per category, every
/// contributing engine listed.
pub fn page(page: &ResultPage, flags: DisplayFlags) {
    println!();
    for (i, result) in page.results().iter().enumerate() {
        print_result(i + 1, result, flags);
    }
    if page.is_empty() {
        println!("{}", "No results found.".dimmed());
        println!();
    }
}

fn print_result(index: usize, result: &SearchResult, flags: DisplayFlags) {
    let title = truncate_title(&result.title);
    println!(
        " {} {} {}",
        format!("{index:>2}.").cyan(),
        title.green().bold(),
        format!("[{}]", result.domain()).yellow()
    );
    if flags.expand {
        println!("{CONTENT_INDENT}{}", result.url.blue());
    }

    for line in wrapped_content(&result.content) {
        println!("{CONTENT_INDENT}{line}");
    }

    match result.category.as_deref() {
        Some("news") | Some("social media") => {
            if let Some(date) = result.published_date.as_deref().and_then(format_date) {
                println!("{CONTENT_INDENT}{}", date.cyan().dimmed());
            }
        }
        Some("images") => {
            let detail = [result.resolution.as_deref(), result.source.as_deref()]
                .iter()
                .flatten()
                .copied()
                .collect::<Vec<_>>()
                .join(" ");
            if !detail.is_empty() {
                println!("{CONTENT_INDENT}{}", detail.cyan().dimmed());
            }
            if let Some(src) = &result.img_src {
                println!("{CONTENT_INDENT}{}", src.blue());
            }
        }
        Some("videos") | Some("music") => {
            let detail = [result.length.as_deref(), result.author.as_deref()]
                .iter()
                .flatten()
                .copied()
                .collect::<Vec<_>>()
                .join(" ");
            if !detail.is_empty() {
                println!("{CONTENT_INDENT}{}", detail.cyan().dimmed());
            }
        }
        Some("science") => {
            let detail = [
                result.published_date.as_deref().and_then(format_date),
                result.journal.clone(),
                result.publisher.clone(),
            ]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
            if !detail.is_empty() {
                println!("{CONTENT_INDENT}{}", detail.cyan().dimmed());
            }
        }
        Some("files") => {
            if let Some(magnet) = &result.magnetlink {
                println!("{CONTENT_INDENT}{}", magnet.cyan().dimmed());
            }
            let mut detail = Vec::new();
            if let Some(size) = &result.filesize {
                detail.push(size.clone());
            }
            if let (Some(seed), Some(leech)) = (&result.seed, &result.leech) {
                detail.push(format!("↑{seed} seeders, ↓{leech} leechers"));
            }
            if let Some(meta) = &result.metadata {
                detail.push(meta.clone());
            }
            if !detail.is_empty() {
                println!("{CONTENT_INDENT}{}", detail.join(" ").cyan().dimmed());
            }
        }
        _ => {}
    }

    if !result.engines.is_empty() {
        println!(
            "{CONTENT_INDENT}{}",
            format!("[{}]", result.engines.join(", ")).dimmed()
        );
    }
    println!();
}

/// Truncate to a fixed display width, not a byte or char count.
fn truncate_title(title: &str) -> String {
    let mut width = 0;
    let mut out = String::new();
    for c in title.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > TITLE_WIDTH - 3 {
            out.push_str("...");
            return out;
        }
        width += w;
        out.push(c);
    }
    out
}

fn wrapped_content(content: &str) -> Vec<String> {
    if content.trim().is_empty() {
        return Vec::new();
    }
    // Render wide and reflow below; html2text's own wrapping is only
    // needed to flatten the markup.
    let flat = html2text::from_read(content.as_bytes(), 400).replace('\n', " ");
    let words: Vec<&str> = flat.split_whitespace().collect();
    let text = if words.len() > MAX_CONTENT_WORDS {
        format!("{} ...", words[..MAX_CONTENT_WORDS].join(" "))
    } else {
        words.join(" ")
    };
    textwrap::wrap(&text, content_width())
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

/// Parse the few date shapes engines actually emit and render them short.
fn format_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.format("%b %-d, %Y").to_string());
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.format("%b %-d, %Y").to_string());
    }
    if let Ok(d) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d.format("%b %-d, %Y").to_string());
    }
    None
}

/// Snapshot of the current context and flags, for the settings command.
pub fn settings(context: &QueryContext, flags: DisplayFlags) {
    println!();
    let row = |key: &str, value: String| {
        println!("  {:<12} {}", key.cyan(), value);
    };
    row("query", context.query().to_string());
    row(
        "categories",
        if context.categories().is_empty() {
            "(server default)".to_string()
        } else {
            context
                .categories()
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        },
    );
    row(
        "engines",
        if context.engines().is_empty() {
            "(all available)".to_string()
        } else {
            context.engines().iter().cloned().collect::<Vec<_>>().join(" ")
        },
    );
    row("safe search", context.safe_search().to_string());
    row(
        "time range",
        context
            .time_range()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "none".to_string()),
    );
    row("site", context.site().unwrap_or("none").to_string());
    row("language", context.language().unwrap_or("(server default)").to_string());
    row(
        "per page",
        if context.page_size() == 0 {
            "(server default)".to_string()
        } else {
            context.page_size().to_string()
        },
    );
    row("page", (context.page_index() + 1).to_string());
    row(
        "flags",
        format!(
            "expand={} color={} debug={}",
            flags.expand, flags.color, flags.debug
        ),
    );
    println!();
}

/// Full structured dump of one result, for the inspect command.
pub fn raw(result: &SearchResult) {
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{json}"),
        Err(e) => error(&e),
    }
}

pub fn help() {
    println!(
        "
  QUERY            start a new search
  e [ENGINE...]    restrict engines; +name adds, -name removes, none clears
  c [CATEGORY...]  restrict categories; same +/- grammar
  n / p / f        next / previous / first page
  t RANGE          time range: day week month year none (d w m y)
  w SITE           restrict to a site ('none' clears)
  ss LEVEL         safe search: none moderate strict
  x / d / a        toggle url expansion / debug line / color
  INDEX, o [INDEX] open result in the browser (o alone opens the first)
  l                open a random result
  y [INDEX]        copy result url to the clipboard
  j INDEX          show one result's full data
  s                show current settings
  q, quit, exit    leave
"
    );
}

/// One dim line summarizing what was just sent, behind the debug toggle.
pub fn debug_line(context: &QueryContext, returned: usize) {
    let engines = if context.engines().is_empty() {
        "all".to_string()
    } else {
        context.engines().iter().cloned().collect::<Vec<_>>().join(",")
    };
    println!(
        "{}",
        format!(
            "query={:?} page={} engines={} safesearch={} -> {} results",
            context.query(),
            context.page_index() + 1,
            engines,
            context.safe_search(),
            returned
        )
        .dimmed()
    );
}

pub fn error(err: &dyn std::fmt::Display) {
    eprintln!("{} {err}", "Error:".red().bold());
}

pub fn warn(message: &str) {
    eprintln!("{} {message}", "Warning:".yellow());
}

pub fn notice(message: &str) {
    println!("{}", message.dimmed());
}

/// Engine roster table for `--list-engines`.
pub fn engine_table(engines: &[crate::client::EngineInfo]) {
    println!();
    for engine in engines {
        let marker = if engine.enabled { " " } else { "-" };
        let shortcut = engine.shortcut.as_deref().unwrap_or("");
        println!(
            " {marker} {:<28} {:<6} {}",
            engine.name.green(),
            shortcut.cyan(),
            engine.categories.join(", ").dimmed()
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_truncate_on_display_width() {
        let long = "a".repeat(100);
        let t = truncate_title(&long);
        assert!(t.ends_with("..."));
        assert!(t.chars().count() <= TITLE_WIDTH);
        assert_eq!(truncate_title("short"), "short");
    }

    #[test]
    fn content_is_flattened_and_capped() {
        let html = "<p>one <b>two</b> three</p>";
        let lines = wrapped_content(html);
        assert!(!lines.is_empty());
        let joined = lines.join(" ");
        assert!(joined.contains("one"));
        assert!(joined.contains("three"));

        let many = (0..200).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
        let capped = wrapped_content(&many).join(" ");
        assert!(capped.ends_with("..."));
    }

    #[test]
    fn dates_render_short() {
        assert_eq!(
            format_date("2023-01-15T10:30:00Z").as_deref(),
            Some("Jan 15, 2023")
        );
        assert_eq!(format_date("2023-01-15").as_deref(), Some("Jan 15, 2023"));
        assert_eq!(format_date("yesterday"), None);
    }
}
