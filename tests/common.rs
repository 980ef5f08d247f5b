#![allow(dead_code)]

use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use rust_xlsxwriter::Workbook;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

pub const HEADERS: [&str; 3] = ["N", "MUNICÍPIO", "VLR. TOTAL"];

pub const DEFAULT_BODY: &str = r#"<w:p><w:r><w:t>Ofício nº {{numero_oficio}}</w:t></w:r></w:p><w:p><w:r><w:t xml:space="preserve">Ao Prefeito de {{prefeito_municipio}}</w:t></w:r></w:p><w:p><w:r><w:t>Valor repassado: R$ {{valor}}</w:t></w:r></w:p>"#;

#[derive(Debug, Clone)]
pub enum Cell {
    Num(f64),
    Text(&'static str),
    Empty,
}

/// Write an xlsx whose first two rows hold a title, headers on row 3 and
/// data from row 4.
pub fn write_spreadsheet(path: &Path, headers: &[&str], rows: &[Vec<Cell>]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "PREFEITURAS - REPASSES").unwrap();
    worksheet.write_string(1, 0, "Competência 03/2024").unwrap();

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(2, col as u16, *header).unwrap();
    }
    for (i, row) in rows.iter().enumerate() {
        let r = 3 + i as u32;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                Cell::Num(n) => {
                    worksheet.write_number(r, col as u16, *n).unwrap();
                }
                Cell::Text(t) => {
                    worksheet.write_string(r, col as u16, *t).unwrap();
                }
                Cell::Empty => {}
            }
        }
    }

    workbook.save(path).unwrap();
}

pub fn row(n: Cell, municipality: Cell, amount: Cell) -> Vec<Cell> {
    vec![n, municipality, amount]
}

fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr/></w:body></w:document>"#
    )
}

/// Minimal DOCX package with `body` as the paragraphs of the main part.
pub fn docx_bytes(body: &str, header: Option<&str>) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#,
    )
    .unwrap();

    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(document_xml(body).as_bytes()).unwrap();

    if let Some(header) = header {
        zip.start_file("word/header1.xml", options).unwrap();
        zip.write_all(
            format!(
                r#"<w:hdr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">{header}</w:hdr>"#
            )
            .as_bytes(),
        )
        .unwrap();
    }

    zip.finish().unwrap().into_inner()
}

pub fn write_template(path: &Path, body: &str) {
    std::fs::write(path, docx_bytes(body, None)).unwrap();
}

pub fn read_part(docx: &Path, part: &str) -> String {
    let mut archive = ZipArchive::new(File::open(docx).unwrap()).unwrap();
    let mut xml = String::new();
    archive.by_name(part).unwrap().read_to_string(&mut xml).unwrap();
    xml
}

pub fn zip_entry_names(bytes: &[u8]) -> Vec<String> {
    let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}
