//! # Lead Store Module
//!
//! Write-once persistence of completed leads in a local file, either as a
//! JSON object keyed by user id or as appended plain-text blocks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;

use crate::config::LeadsFormat;
use crate::dialogue::Lead;
use crate::errors::StoreError;

/// Destination for completed leads
#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn save(&self, user_id: i64, lead: &Lead) -> Result<(), StoreError>;
}

/// Persisted form of a lead
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub user_id: i64,
    pub name: String,
    pub phone: String,
    pub object_type: Option<String>,
    pub region: Option<String>,
    pub monthly_bill: Option<String>,
    pub bill_amount: Option<u32>,
    pub timestamp: DateTime<Utc>,
}

impl LeadRecord {
    pub fn from_lead(user_id: i64, lead: &Lead) -> Self {
        Self {
            user_id,
            name: lead.name.clone().unwrap_or_default(),
            phone: lead.phone.clone().unwrap_or_default(),
            object_type: lead.object_type.clone(),
            region: lead.region.clone(),
            monthly_bill: lead.monthly_bill.clone(),
            bill_amount: lead.bill_amount,
            timestamp: lead.timestamp.unwrap_or_else(Utc::now),
        }
    }
}

/// Build the store selected by configuration
pub fn open_lead_store(format: LeadsFormat, path: impl Into<PathBuf>) -> Arc<dyn LeadStore> {
    match format {
        LeadsFormat::Json => Arc::new(JsonLeadStore::new(path)),
        LeadsFormat::Text => Arc::new(TextLeadStore::new(path)),
    }
}

/// JSON object file mapping user id to that user's latest lead
pub struct JsonLeadStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLeadStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Read every stored lead. A missing file reads as empty.
    pub async fn load_all(&self) -> Result<BTreeMap<String, LeadRecord>, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[async_trait]
impl LeadStore for JsonLeadStore {
    async fn save(&self, user_id: i64, lead: &Lead) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut leads = self.load_all().await?;
        let replaced = leads
            .insert(user_id.to_string(), LeadRecord::from_lead(user_id, lead))
            .is_some();

        let content = serde_json::to_string_pretty(&leads)?;
        let temp_path = temp_path_for(&self.path);
        fs::write(&temp_path, content).await?;
        fs::rename(&temp_path, &self.path).await?;

        info!(user_id, replaced, path = %self.path.display(), "Lead saved to JSON store");
        Ok(())
    }
}

/// Plain-text file with one appended block per saved lead
pub struct TextLeadStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TextLeadStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }
}

/// Render a lead as a text block
pub fn format_lead_block(record: &LeadRecord) -> String {
    let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    format!(
        "=== Lead {timestamp} ===\n\
         user_id: {user_id}\n\
         name: {name}\n\
         phone: {phone}\n\
         object: {object}\n\
         region: {region}\n\
         bill: {bill}\n\n",
        timestamp = record.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        user_id = record.user_id,
        name = record.name,
        phone = record.phone,
        object = optional(&record.object_type),
        region = optional(&record.region),
        bill = optional(&record.monthly_bill),
    )
}

#[async_trait]
impl LeadStore for TextLeadStore {
    async fn save(&self, user_id: i64, lead: &Lead) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let block = format_lead_block(&LeadRecord::from_lead(user_id, lead));
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(block.as_bytes()).await?;
        file.flush().await?;

        info!(user_id, path = %self.path.display(), "Lead appended to text store");
        Ok(())
    }
}
