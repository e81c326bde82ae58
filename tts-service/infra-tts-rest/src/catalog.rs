use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tts_domain::{DomainError, VoiceCatalogPort, VoiceReference, VoiceSummary};

const MANIFEST_FILE: &str = "voices.json";

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    id: String,
    #[serde(default)]
    description: String,
}

/// Voice presets read once from `{dir}/voices.json` and `{dir}/{id}.json`.
///
/// A preset whose data file cannot be read stays listed; lookups for it return the
/// load error.
#[derive(Debug)]
pub struct FileVoiceCatalog {
    voices: Vec<VoiceSummary>,
    references: HashMap<String, Result<VoiceReference, String>>,
}

impl FileVoiceCatalog {
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let dir = dir.as_ref();
        let manifest_path = dir.join(MANIFEST_FILE);
        let raw = fs::read_to_string(&manifest_path).map_err(|err| {
            DomainError::external_service_error(
                "voices",
                &format!("failed to read {}: {err}", manifest_path.display()),
            )
        })?;
        let entries: Vec<ManifestEntry> = serde_json::from_str(&raw).map_err(|err| {
            DomainError::external_service_error(
                "voices",
                &format!("invalid {}: {err}", manifest_path.display()),
            )
        })?;

        let mut voices = Vec::with_capacity(entries.len());
        let mut references = HashMap::with_capacity(entries.len());
        for entry in entries {
            if references.contains_key(&entry.id) {
                tracing::warn!(voice = %entry.id, "duplicate voice id in manifest; keeping first");
                continue;
            }

            let reference = read_reference(&reference_path(dir, &entry.id));
            if let Err(err) = &reference {
                tracing::warn!(voice = %entry.id, error = %err, "voice preset data failed to load");
            }
            references.insert(entry.id.clone(), reference);
            voices.push(VoiceSummary {
                id: entry.id,
                description: entry.description,
            });
        }

        tracing::info!(
            dir = %dir.display(),
            voice_count = voices.len(),
            "voice catalog loaded"
        );
        Ok(Self { voices, references })
    }
}

fn reference_path(dir: &Path, voice_id: &str) -> PathBuf {
    dir.join(format!("{voice_id}.json"))
}

fn read_reference(path: &Path) -> Result<VoiceReference, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    serde_json::from_str(&raw).map_err(|err| format!("invalid {}: {err}", path.display()))
}

impl VoiceCatalogPort for FileVoiceCatalog {
    fn list_voices(&self) -> Vec<VoiceSummary> {
        self.voices.clone()
    }

    fn voice_reference(&self, voice_id: &str) -> Result<VoiceReference, DomainError> {
        match self.references.get(voice_id) {
            Some(Ok(reference)) => Ok(reference.clone()),
            Some(Err(message)) => Err(DomainError::external_service_error("voices", message)),
            None => Err(DomainError::not_found(&format!("voice `{voice_id}`"))),
        }
    }

    fn contains(&self, voice_id: &str) -> bool {
        self.references.contains_key(voice_id)
    }
}
