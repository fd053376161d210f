//! Writes `sample_data.csv` and `sample_data.xlsx`: a small, deliberately
//! messy table with duplicate rows, gaps in numeric columns and a text
//! column, for trying out the cleaner by hand.

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};

const HEADERS: [&str; 6] = ["store", "city", "visitors", "revenue", "rating", "open_late"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

#[derive(Clone)]
enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Empty,
}

impl Cell {
    fn to_csv(&self) -> String {
        match self {
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => format!("{f:.2}"),
            Cell::Text(s) => s.clone(),
            Cell::Bool(true) => "True".to_string(),
            Cell::Bool(false) => "False".to_string(),
            Cell::Empty => String::new(),
        }
    }
}

fn generate_rows(rng: &mut SimpleRng, n: usize) -> Vec<Vec<Cell>> {
    let cities = ["Lisbon", "Oslo", "Quito", "Hanoi", "Perth"];
    let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(n);

    for i in 0..n {
        // roughly one row in eight repeats an earlier one verbatim
        if i > 0 && rng.chance(0.125) {
            let earlier = (rng.next_u64() % i as u64) as usize;
            let copy = rows[earlier].clone();
            rows.push(copy);
            continue;
        }

        let visitors = 50 + (rng.next_f64() * 450.0) as i64;
        let revenue = visitors as f64 * (8.0 + rng.next_f64() * 12.0);
        let rating = 1.0 + rng.next_f64() * 4.0;

        rows.push(vec![
            Cell::Text(format!("S{:03}", i + 1)),
            Cell::Text(rng.pick(&cities).to_string()),
            Cell::Int(visitors),
            if rng.chance(0.15) { Cell::Empty } else { Cell::Float(revenue) },
            if rng.chance(0.2) { Cell::Empty } else { Cell::Float(rating) },
            Cell::Bool(rng.chance(0.4)),
        ]);
    }
    rows
}

fn write_csv(path: &str, rows: &[Vec<Cell>]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(HEADERS)?;
    for row in rows {
        writer.write_record(row.iter().map(Cell::to_csv))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_xlsx(path: &str, rows: &[Vec<Cell>]) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();

    for (c, name) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, c as u16, *name, &bold)?;
    }
    for (r, row) in rows.iter().enumerate() {
        let r = r as u32 + 1;
        for (c, cell) in row.iter().enumerate() {
            let c = c as u16;
            match cell {
                Cell::Int(i) => {
                    sheet.write_number(r, c, *i as f64)?;
                }
                Cell::Float(f) => {
                    sheet.write_number(r, c, (f * 100.0).round() / 100.0)?;
                }
                Cell::Text(s) => {
                    sheet.write_string(r, c, s)?;
                }
                Cell::Bool(b) => {
                    sheet.write_boolean(r, c, *b)?;
                }
                Cell::Empty => {}
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("writing {path}"))?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng, 40);

    write_csv("sample_data.csv", &rows)?;
    write_xlsx("sample_data.xlsx", &rows)?;

    println!(
        "Wrote {} rows ({} columns) to sample_data.csv and sample_data.xlsx",
        rows.len(),
        HEADERS.len()
    );
    Ok(())
}
