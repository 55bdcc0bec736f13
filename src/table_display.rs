use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use crossterm::style::Stylize;
use table_view::view::{PageItem, SortDirection, TableViewController};

pub fn display_page(controller: &TableViewController) {
    if let Some(message) = controller.empty_message() {
        println!("{}", message.yellow());
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let headers: Vec<Cell> = controller
        .headers()
        .into_iter()
        .map(|h| {
            let label = match h.sort {
                Some(SortDirection::Ascending) => format!("{} ▲", h.label),
                Some(SortDirection::Descending) => format!("{} ▼", h.label),
                None => h.label,
            };
            Cell::new(label).add_attribute(Attribute::Bold)
        })
        .collect();
    table.set_header(headers);

    for row in controller.page_rows() {
        let cells = row.cells.into_iter().map(|text| {
            let cell = Cell::new(text);
            if row.disabled {
                cell.fg(Color::DarkGrey)
            } else {
                cell
            }
        });
        table.add_row(cells);
    }

    println!("{table}");
    println!(
        "\n{}  {}",
        format!(
            "Page {} of {} ({} of {} rows)",
            controller.current_page(),
            controller.total_pages(),
            controller.filtered_count(),
            controller.total_count()
        )
        .green(),
        pager_strip(&controller.page_numbers(), controller.current_page())
    );
}

/// "1 … 4 [5] 6 … 10"
pub fn pager_strip(items: &[PageItem], current: usize) -> String {
    items
        .iter()
        .map(|item| match item {
            PageItem::Page(n) if *n == current => format!("[{}]", n),
            PageItem::Page(n) => n.to_string(),
            PageItem::Ellipsis => "…".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
