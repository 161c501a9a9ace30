use crate::padron::*;

use serde::{Deserialize, Serialize};
use std::path::Path;

use voter_analytics::age::DEFAULT_REFERENCE_YEAR;

/// Environment variable holding the password salt when the configuration does not.
pub const SALT_ENV_VAR: &str = "PADRON_SALT";

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "dashboardName")]
    pub dashboard_name: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
}

/// Header names of the voter roll. Every field defaults to the header of
/// the exported rolls.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RollColumns {
    #[serde(rename = "documentId")]
    pub document_id: Option<String>,
    #[serde(rename = "birthYear")]
    pub birth_year: Option<String>,
    pub gender: Option<String>,
    pub occupation: Option<String>,
    pub zone: Option<String>,
    pub polygon: Option<String>,
    pub longitude: Option<String>,
    pub latitude: Option<String>,
}

impl RollColumns {
    pub fn document_id(&self) -> &str {
        self.document_id.as_deref().unwrap_or("nro_documento")
    }
    pub fn birth_year(&self) -> &str {
        self.birth_year.as_deref().unwrap_or("fecha_nacimiento")
    }
    pub fn gender(&self) -> &str {
        self.gender.as_deref().unwrap_or("genero")
    }
    pub fn occupation(&self) -> &str {
        self.occupation.as_deref().unwrap_or("profesion")
    }
    pub fn zone(&self) -> &str {
        self.zone.as_deref().unwrap_or("zona")
    }
    pub fn polygon(&self) -> &str {
        self.polygon.as_deref().unwrap_or("poligono")
    }
    pub fn longitude(&self) -> &str {
        self.longitude.as_deref().unwrap_or("lon")
    }
    pub fn latitude(&self) -> &str {
        self.latitude.as_deref().unwrap_or("lat")
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct VoterRollSource {
    /// `tsv` (default) or `xlsx`.
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    pub columns: Option<RollColumns>,
}

impl VoterRollSource {
    pub fn columns(&self) -> RollColumns {
        self.columns.clone().unwrap_or_default()
    }
}

/// An election period. The roll has one vote-status column per period.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Period {
    pub name: String,
    /// Absent while the signed rolls of the period have not been loaded.
    #[serde(rename = "voteStatusColumn")]
    pub vote_status_column: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    #[serde(rename = "filePath")]
    pub file_path: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsSource {
    #[serde(rename = "filePath")]
    pub file_path: String,
    pub salt: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "referenceYear")]
    pub reference_year: Option<i32>,
    #[serde(rename = "voterRoll")]
    pub voter_roll: VoterRollSource,
    pub periods: Vec<Period>,
    pub polygons: FileSource,
    #[serde(rename = "thetaEstimates")]
    pub theta_estimates: Option<FileSource>,
    #[serde(rename = "thetaBootstrap")]
    pub theta_bootstrap: Option<FileSource>,
    /// Bootstrap replicates in long format, for the overview intervals.
    #[serde(rename = "thetaSamples")]
    pub theta_samples: Option<FileSource>,
    pub credentials: CredentialsSource,
}

impl DashboardConfig {
    pub fn reference_year(&self) -> i32 {
        self.reference_year.unwrap_or(DEFAULT_REFERENCE_YEAR)
    }

    /// Paths in the configuration are relative to the configuration file.
    pub fn resolve(&self, root: &Path, file_path: &str) -> String {
        root.join(file_path).display().to_string()
    }

    /// The named period, or the first one when no name is given.
    pub fn period(&self, name: Option<&str>) -> PadronResult<&Period> {
        let found = match name {
            Some(n) => self.periods.iter().find(|p| p.name == n),
            None => self.periods.first(),
        };
        match found {
            Some(p) => Ok(p),
            None => whatever!("Unknown period {:?}", name.unwrap_or("<first>")),
        }
    }

    pub fn salt(&self) -> String {
        match &self.credentials.salt {
            Some(s) => s.clone(),
            None => std::env::var(SALT_ENV_VAR).unwrap_or_default(),
        }
    }
}

pub fn read_config(path: &str) -> PadronResult<DashboardConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config: DashboardConfig =
        serde_json::from_str(&contents).context(ParsingJsonSnafu { path })?;
    if config.periods.is_empty() {
        whatever!("The configuration {} does not define any period", path)
    }
    Ok(config)
}
