// Markdown and CSV export of a task snapshot

use crate::task::{Task, now_ms};
use eyre::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const CSV_HEADER: &str = "id,title,detail,tags,createdAt,done";

/// Write `todoq_<YYYY-MM-DD>.md` into `dir` and return its path
pub fn export_markdown(dir: &Path, tasks: &[Task]) -> Result<PathBuf> {
    let date = chrono::Utc::now().format("%Y-%m-%d");
    let out = dir.join(format!("todoq_{}.md", date));
    write_export(&out, &render_markdown(tasks))?;
    info!(file = ?out, count = tasks.len(), "Exported Markdown");
    Ok(out)
}

/// Write `todoq_<epoch-ms>.csv` into `dir` and return its path
pub fn export_csv(dir: &Path, tasks: &[Task]) -> Result<PathBuf> {
    let out = dir.join(format!("todoq_{}.csv", now_ms()));
    write_export(&out, &render_csv(tasks))?;
    info!(file = ?out, count = tasks.len(), "Exported CSV");
    Ok(out)
}

pub fn render_markdown(tasks: &[Task]) -> String {
    let mut lines = vec!["# TODO Queue".to_string(), String::new()];

    for t in tasks {
        let mark = if t.done { "x" } else { " " };
        let tags = if t.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", t.tags.join(", "))
        };
        let mut line = format!("- [{}] {}{}", mark, t.title, tags);
        if let Some(detail) = t.detail.as_deref().filter(|d| !d.is_empty()) {
            line.push('\n');
            line.push_str(detail);
        }
        lines.push(line);
    }

    lines.join("\n")
}

pub fn render_csv(tasks: &[Task]) -> String {
    let mut out = String::from(CSV_HEADER);

    for t in tasks {
        // Ids are generated, never user text, and go out unquoted
        let row = [
            t.id.clone(),
            escape_csv(&t.title),
            escape_csv(t.detail.as_deref().unwrap_or("")),
            escape_csv(&t.tags.join("|")),
            t.created_at.to_string(),
            if t.done { "1" } else { "0" }.to_string(),
        ];
        out.push('\n');
        out.push_str(&row.join(","));
    }

    out
}

/// Quote a field when it contains a comma, quote or newline
pub fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_export(path: &Path, content: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create export directory {}", dir.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn task(title: &str, done: bool, detail: Option<&str>, tags: &[&str]) -> Task {
        Task {
            id: format!("id-{}", title.len()),
            title: title.to_string(),
            detail: detail.map(String::from),
            tags: tags.iter().map(|s| s.to_string()).collect(),
            created_at: 1_700_000_000_123,
            done,
        }
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("a,b\"c"), "\"a,b\"\"c\"");
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("two\nlines"), "\"two\nlines\"");
        assert_eq!(escape_csv(""), "");
    }

    #[test]
    fn test_render_markdown() {
        let tasks = vec![
            task("Buy milk", true, None, &["home", "errand"]),
            task("Write", false, Some("first draft"), &[]),
        ];

        let md = render_markdown(&tasks);
        assert_eq!(
            md,
            "# TODO Queue\n\n- [x] Buy milk [home, errand]\n- [ ] Write\nfirst draft"
        );
    }

    #[test]
    fn test_render_markdown_empty() {
        assert_eq!(render_markdown(&[]), "# TODO Queue\n");
    }

    #[test]
    fn test_render_csv() {
        let tasks = vec![
            task("a,b\"c", false, Some("x"), &["t1", "t2"]),
            task("ok", true, None, &[]),
        ];

        let csv = render_csv(&tasks);
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines[0], "id,title,detail,tags,createdAt,done");
        assert_eq!(lines[1], "id-5,\"a,b\"\"c\",x,t1|t2,1700000000123,0");
        assert_eq!(lines[2], "id-2,ok,,,1700000000123,1");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_render_csv_writes_id_raw() {
        let mut t = task("title", false, None, &[]);
        t.id = "odd,id".to_string();

        let csv = render_csv(&[t]);
        let row = csv.split('\n').nth(1).unwrap();
        assert_eq!(row, "odd,id,title,,,1700000000123,0");
    }

    #[test]
    fn test_export_markdown_file_name() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("export");

        let path = export_markdown(&dir, &[task("x", false, None, &[])]).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("todoq_"));
        assert!(name.ends_with(".md"));
        // todoq_YYYY-MM-DD.md
        assert_eq!(name.len(), "todoq_2024-01-01.md".len());
        assert!(fs::read_to_string(&path).unwrap().contains("- [ ] x"));
    }

    #[test]
    fn test_export_csv_file_name() {
        let temp = TempDir::new().unwrap();

        let path = export_csv(temp.path(), &[]).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        let stamp = name.strip_prefix("todoq_").unwrap().strip_suffix(".csv").unwrap();
        assert!(stamp.parse::<i64>().unwrap() > 1_600_000_000_000);
        assert_eq!(fs::read_to_string(&path).unwrap(), CSV_HEADER);
    }
}
