//! Row layout and plain-text rendering helpers

use crate::domain::input::NumberedMenu;
use crate::domain::messenger::{Button, ButtonRow, FileSource, OutgoingFile};

/// Split items into rows of at most `per_row` entries
pub fn chunk_rows<T: Clone>(items: &[T], per_row: usize) -> Vec<Vec<T>> {
    items
        .chunks(per_row.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// One button per row
pub fn single_column(buttons: &[Button]) -> Vec<ButtonRow> {
    chunk_rows(buttons, 1)
}

/// Message text followed by the numbered option list
pub fn render_numbered(text: &str, menu: &NumberedMenu) -> String {
    if menu.is_empty() {
        return text.to_string();
    }

    format!("{}\n\n{}\n\nReply with a number.", text, menu.render())
}

pub fn render_contact_request(text: &str, button_label: &str) -> String {
    format!("{}\n\n[{}] Type your phone number.", text, button_label)
}

pub fn render_file(file: &OutgoingFile) -> String {
    let location = match &file.source {
        FileSource::Url(url) => url.clone(),
        FileSource::Bytes(bytes) => format!("{} bytes", bytes.len()),
    };

    match &file.caption {
        Some(caption) => format!("{}\n[file: {} ({})]", caption, file.file_name, location),
        None => format!("[file: {} ({})]", file.file_name, location),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::input::{CallbackData, Choice};

    #[test]
    fn test_chunk_rows() {
        let rows = chunk_rows(&[1, 2, 3, 4, 5], 2);
        assert_eq!(rows, vec![vec![1, 2], vec![3, 4], vec![5]]);
        assert_eq!(chunk_rows(&[1, 2], 0), vec![vec![1], vec![2]]);
        assert!(chunk_rows::<u8>(&[], 3).is_empty());
    }

    #[test]
    fn test_single_column() {
        let buttons = vec![
            Button::new("A", CallbackData::select("a")),
            Button::new("B", CallbackData::select("b")),
        ];
        assert_eq!(single_column(&buttons).len(), 2);
    }

    #[test]
    fn test_render_numbered() {
        let menu = NumberedMenu::new(vec![Choice::label("Profile"), Choice::label("Log out")]);
        let text = render_numbered("Main menu", &menu);
        assert_eq!(text, "Main menu\n\n1. Profile\n2. Log out\n\nReply with a number.");
        assert_eq!(render_numbered("Hi", &NumberedMenu::default()), "Hi");
    }

    #[test]
    fn test_render_file() {
        let file = OutgoingFile::url("invoice.pdf", "https://files.example/1").with_caption("Invoice");
        assert_eq!(
            render_file(&file),
            "Invoice\n[file: invoice.pdf (https://files.example/1)]"
        );
        assert_eq!(
            render_file(&OutgoingFile::bytes("a.txt", vec![0; 3])),
            "[file: a.txt (3 bytes)]"
        );
    }
}
