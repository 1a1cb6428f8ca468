use comfy_table::{Cell, Table};

use crate::categories::ALL;
use crate::error::Result;

pub fn list() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Code", "Description", "Type", "Itemized"]);
    for cat in ALL {
        table.add_row(vec![
            Cell::new(cat.code()),
            Cell::new(cat.description()),
            Cell::new(cat.kind().as_str()),
            Cell::new(if cat.requires_itemization() { "yes" } else { "" }),
        ]);
    }
    println!("IRS Categories\n{table}");
    Ok(())
}
