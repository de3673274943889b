use std::path::PathBuf;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path, CATEGORY_FILE};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;

    let categories = resolved.join(CATEGORY_FILE);
    if settings.categories_file.is_none() && !categories.exists() {
        std::fs::write(&categories, "{}\n")?;
        println!("Created empty category table at {}", categories.display());
    }

    let conn = get_connection(&settings.db_path())?;
    init_db(&conn)?;
    save_settings(&settings)?;

    println!("Initialized birr at {}", resolved.display());
    Ok(())
}
