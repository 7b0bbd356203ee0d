pub const MAX_LINE_CHARS: usize = 80;
pub const LINES_PER_PAGE: usize = 4;
const SEPARATOR: &str = ", ";

/// Packs terms into lines of at most `max_chars`, separated by ", ". A term
/// longer than the limit gets a line of its own.
pub fn build_lines(terms: &[String], max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for term in terms {
        if line.is_empty() {
            line.push_str(term);
            continue;
        }
        if line.chars().count() + SEPARATOR.len() + term.chars().count() <= max_chars {
            line.push_str(SEPARATOR);
            line.push_str(term);
        } else {
            lines.push(std::mem::take(&mut line));
            line.push_str(term);
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

pub struct PageSettings<'a> {
    /// Receives the page number and total page count.
    pub header: &'a dyn Fn(usize, usize) -> String,
    /// Receives the next page number. Only used when one exists.
    pub footer: &'a dyn Fn(usize) -> String,
    pub nothing_to_display: &'a str,
    pub lines_per_page: usize,
}

/// The reply lines for one page. `page` is 1-based.
pub fn render_page(lines: &[String], page: usize, settings: &PageSettings<'_>) -> Result<Vec<String>, String> {
    if lines.is_empty() {
        return Ok(vec![settings.nothing_to_display.to_string()]);
    }
    let per_page = settings.lines_per_page.max(1);
    let total = lines.len().div_ceil(per_page);
    if page == 0 || page > total {
        return Err(format!(
            "Page {} does not exist, there are {} pages.",
            page, total
        ));
    }
    let start = (page - 1) * per_page;
    let end = (start + per_page).min(lines.len());

    let mut out = Vec::with_capacity(end - start + 2);
    out.push((settings.header)(page, total));
    out.extend(lines[start..end].iter().cloned());
    if page < total {
        out.push((settings.footer)(page + 1));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(count: usize) -> Vec<String> {
        (0..count).map(|index| format!("Inventory {:02}", index)).collect()
    }

    fn settings<'a>(
        header: &'a dyn Fn(usize, usize) -> String,
        footer: &'a dyn Fn(usize) -> String,
    ) -> PageSettings<'a> {
        PageSettings {
            header,
            footer,
            nothing_to_display: "nothing",
            lines_per_page: LINES_PER_PAGE,
        }
    }

    #[test]
    fn lines_respect_width() {
        let lines = build_lines(&names(30), MAX_LINE_CHARS);
        // "Inventory 00" is 12 chars; six of them joined is 82, five is 68.
        assert_eq!(lines.len(), 6);
        assert!(lines.iter().all(|line| line.chars().count() <= MAX_LINE_CHARS));
        assert_eq!(lines.join(", ").split(", ").count(), 30);
    }

    #[test]
    fn oversized_term_stands_alone() {
        let long = "x".repeat(100);
        let lines = build_lines(&["a".to_string(), long.clone(), "b".to_string()], MAX_LINE_CHARS);
        assert_eq!(lines, vec!["a".to_string(), long, "b".to_string()]);
    }

    #[test]
    fn pages_have_header_and_next_footer() {
        let header = |page: usize, total: usize| format!("Inventories ({}/{}):", page, total);
        let footer = |next: usize| format!("Type /inv list {} for more.", next);
        let settings = settings(&header, &footer);
        let lines = build_lines(&names(30), MAX_LINE_CHARS);

        let first = render_page(&lines, 1, &settings).expect("page");
        assert_eq!(first.len(), 1 + LINES_PER_PAGE + 1);
        assert_eq!(first[0], "Inventories (1/2):");
        assert_eq!(first[5], "Type /inv list 2 for more.");

        let last = render_page(&lines, 2, &settings).expect("page");
        assert_eq!(last.len(), 1 + 2);
        assert!(render_page(&lines, 3, &settings).is_err());
    }

    #[test]
    fn empty_result_uses_placeholder() {
        let header = |_: usize, _: usize| String::new();
        let footer = |_: usize| String::new();
        let out = render_page(&[], 5, &settings(&header, &footer)).expect("page");
        assert_eq!(out, vec!["nothing".to_string()]);
    }
}
