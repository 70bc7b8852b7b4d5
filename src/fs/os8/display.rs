//! Catalog formatting, kept apart from the engine so the walk stays pure.

use super::types::{EntryKind,Pattern};
use super::directory::{Cursor,Directory};

/// Render the directory the way PIP lists it: matched files (and optionally
/// empties) in columns with their block lengths, then a summary line.  The
/// free-block total counts every empty whether or not empties are printed.
pub fn catalog(dir: &Directory,patt: &Pattern,print_empties: bool,columns: usize) -> String {
    let mut ans = String::new();
    let mut column = 0;
    let mut files = 0;
    let mut used = 0;
    let mut free = 0;
    let mut cursor = Cursor::new(dir);
    while let Some(entry) = cursor.next(dir) {
        if entry.is_empty() {
            free += entry.length();
        }
        let label = match &entry.kind {
            EntryKind::Empty {..} if print_empties => "<empty>".to_string(),
            EntryKind::File {name,length,..} if *length != 0 && patt.matches(name) => {
                files += 1;
                used += length;
                name.to_string()
            },
            _ => continue
        };
        column += 1;
        ans += &format!("{:<11}{:>5}",label,entry.length());
        ans += match column % columns {
            0 => "\n",
            _ => "          "
        };
    }
    if column % columns != 0 {
        ans += "\n";
    }
    ans += &format!("\n  {} Files In {} Blocks - {} Free Blocks\n",files,used,free);
    ans
}
