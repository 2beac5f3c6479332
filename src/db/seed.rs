//! Built-in passages loaded into an empty database (World English Bible,
//! public domain).

use rusqlite::Connection;

use super::repository::{insert_passage, insert_version, passage_count};
use crate::domain::{Passage, Version};
use crate::error::Result;

const WEB: &str = "WEB";

pub fn seed_database(conn: &Connection) -> Result<()> {
  if passage_count(conn)? > 0 {
    return Ok(());
  }

  let (passages, versions) = seed_passages();
  let tx = conn.unchecked_transaction()?;
  for version in &versions {
    insert_version(&tx, version)?;
  }
  for passage in &passages {
    insert_passage(&tx, passage)?;
  }
  tx.commit()?;

  tracing::info!("Seeded {} passages", passages.len());
  Ok(())
}

// Helper to create a Psalm passage in the seed version
fn psalm(chapter: u32, verse: u32, text: &str) -> Passage {
  Passage::new("PSA", "Psalms", 19, chapter, verse, text, WEB)
}

pub fn seed_passages() -> (Vec<Passage>, Vec<Version>) {
  let versions = vec![Version {
    code: WEB.to_string(),
    name: "World English Bible".to_string(),
    language: "en".to_string(),
  }];

  let passages = vec![
    psalm(23, 1, "Yahweh is my shepherd: I shall lack nothing."),
    psalm(23, 2, "He makes me lie down in green pastures. He leads me beside still waters."),
    psalm(23, 3, "He restores my soul. He guides me in the paths of righteousness for his name's sake."),
    psalm(
      23,
      4,
      "Even though I walk through the valley of the shadow of death, I will fear no evil, for you are with me. Your rod and your staff, they comfort me.",
    ),
    psalm(
      23,
      5,
      "You prepare a table before me in the presence of my enemies. You anoint my head with oil. My cup runs over.",
    ),
    psalm(
      23,
      6,
      "Surely goodness and loving kindness shall follow me all the days of my life, and I will dwell in Yahweh's house forever.",
    ),
    psalm(24, 1, "The earth is Yahweh's, with its fullness; the world, and those who dwell in it."),
    psalm(24, 2, "For he has founded it on the seas, and established it on the floods."),
  ];

  (passages, versions)
}
