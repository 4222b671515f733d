use std::io::Cursor;

use anyhow::Context;
use docx_rs::{Docx, Paragraph, Run, Table, TableCell, TableRow};

use crate::grid::Grid;

pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const DOCX_FILENAME: &str = "schedule.docx";

const TITLE: &str = "Laundry schedule";

fn text_cell(text: &str) -> TableCell {
    TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text(text)))
}

fn header_cell(text: &str) -> TableCell {
    TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text(text).bold()))
}

fn day_table(grid: &Grid, d: usize) -> Table {
    let mut header = vec![header_cell("Time")];
    header.extend(
        grid.machines
            .iter()
            .map(|number| header_cell(&format!("Machine {}", number))),
    );

    let mut rows = vec![TableRow::new(header)];
    for (t, time_slot) in grid.time_slots.iter().enumerate() {
        let mut cells = vec![text_cell(time_slot.label())];
        cells.extend(
            grid.row(d, t)
                .iter()
                .map(|cell| text_cell(cell.text().unwrap_or(""))),
        );
        rows.push(TableRow::new(cells));
    }

    Table::new(rows)
}

/// Renders the admin grid as a Word document: a title, then a heading and a
/// table per day.
pub fn render_docx(grid: &Grid) -> anyhow::Result<Vec<u8>> {
    let mut docx = Docx::new().add_paragraph(
        Paragraph::new().add_run(Run::new().add_text(TITLE).bold().size(32)),
    );

    for (d, day) in grid.days.iter().enumerate() {
        docx = docx
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text(day).bold().size(26)))
            .add_table(day_table(grid, d));
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .context("Failed to render schedule document")?;
    Ok(buf.into_inner())
}
