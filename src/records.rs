use anyhow::Result;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::crop::{CropRegion, CropSelection};
use crate::phase::PhaseLabel;
use crate::timestamp::CaptureTime;

/// One row of the primary image log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub image_name: String,
    pub class: String,
    pub fire_id: String,
    pub camera_id: String,
    pub capture_time: String,
    pub smoke: bool,
    pub fog: bool,
    pub rain: bool,
    pub glare: bool,
    pub snow: bool,
}

impl ImageRecord {
    pub fn new(
        path: &Path,
        time: &CaptureTime,
        camera_id: &str,
        phase: PhaseLabel,
        fire_id: &str,
    ) -> Self {
        Self {
            image_name: file_name(path),
            class: phase.destination().as_str().to_string(),
            fire_id: fire_id.to_string(),
            camera_id: camera_id.to_string(),
            capture_time: time.record_time(),
            smoke: phase == PhaseLabel::ConfirmedSmoke,
            fog: false,
            rain: false,
            glare: false,
            snow: false,
        }
    }
}

/// One row of the crop log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRecord {
    pub crop_name: String,
    pub region: CropRegion,
    pub source_name: String,
}

impl CropRecord {
    pub fn new(selection: &CropSelection, source: &Path) -> Self {
        Self {
            crop_name: file_name(&selection.output),
            region: selection.region,
            source_name: file_name(source),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Append-only dataset bookkeeping.
pub trait RecordKeeper {
    fn append_image(&mut self, record: &ImageRecord) -> Result<()>;

    fn append_crop(&mut self, record: &CropRecord) -> Result<()>;
}

pub struct SqliteRecordKeeper {
    conn: Connection,
}

impl SqliteRecordKeeper {
    pub fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        let mut keeper = Self { conn };
        keeper.ensure_schema()?;
        Ok(keeper)
    }

    fn ensure_schema(&mut self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;

            CREATE TABLE IF NOT EXISTS images (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              image_name TEXT NOT NULL,
              class TEXT NOT NULL,
              fire_id TEXT NOT NULL,
              camera_id TEXT NOT NULL,
              capture_time TEXT NOT NULL,
              smoke TEXT NOT NULL,
              fog TEXT NOT NULL,
              rain TEXT NOT NULL,
              glare TEXT NOT NULL,
              snow TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS crops (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              crop_name TEXT NOT NULL,
              min_x INTEGER NOT NULL,
              min_y INTEGER NOT NULL,
              max_x INTEGER NOT NULL,
              max_y INTEGER NOT NULL,
              source_name TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_images_fire ON images(fire_id, camera_id);
            "#,
        )?;
        Ok(())
    }

    pub fn image_records(&self) -> Result<Vec<ImageRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT image_name, class, fire_id, camera_id, capture_time, smoke, fog, rain, glare, snow
             FROM images ORDER BY id ASC",
        )?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let flag = |i: usize| -> Result<bool> { Ok(row.get::<_, String>(i)? == "yes") };
            out.push(ImageRecord {
                image_name: row.get(0)?,
                class: row.get(1)?,
                fire_id: row.get(2)?,
                camera_id: row.get(3)?,
                capture_time: row.get(4)?,
                smoke: flag(5)?,
                fog: flag(6)?,
                rain: flag(7)?,
                glare: flag(8)?,
                snow: flag(9)?,
            });
        }
        Ok(out)
    }

    pub fn crop_records(&self) -> Result<Vec<CropRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT crop_name, min_x, min_y, max_x, max_y, source_name FROM crops ORDER BY id ASC",
        )?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(CropRecord {
                crop_name: row.get(0)?,
                region: CropRegion {
                    x0: row.get(1)?,
                    y0: row.get(2)?,
                    x1: row.get(3)?,
                    y1: row.get(4)?,
                },
                source_name: row.get(5)?,
            });
        }
        Ok(out)
    }
}

impl RecordKeeper for SqliteRecordKeeper {
    fn append_image(&mut self, record: &ImageRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO images(image_name, class, fire_id, camera_id, capture_time,
                               smoke, fog, rain, glare, snow)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                record.image_name,
                record.class,
                record.fire_id,
                record.camera_id,
                record.capture_time,
                yes_no(record.smoke),
                yes_no(record.fog),
                yes_no(record.rain),
                yes_no(record.glare),
                yes_no(record.snow),
            ],
        )?;
        log::debug!("image row appended: {:?}", record);
        Ok(())
    }

    fn append_crop(&mut self, record: &CropRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO crops(crop_name, min_x, min_y, max_x, max_y, source_name)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.crop_name,
                record.region.x0,
                record.region.y0,
                record.region.x1,
                record.region.y1,
                record.source_name,
            ],
        )?;
        log::debug!("crop row appended: {:?}", record);
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryRecordKeeper {
    pub images: Vec<ImageRecord>,
    pub crops: Vec<CropRecord>,
}

impl RecordKeeper for InMemoryRecordKeeper {
    fn append_image(&mut self, record: &ImageRecord) -> Result<()> {
        self.images.push(record.clone());
        Ok(())
    }

    fn append_crop(&mut self, record: &CropRecord) -> Result<()> {
        self.crops.push(record.clone());
        Ok(())
    }
}
