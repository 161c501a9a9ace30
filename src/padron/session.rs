// The state of a dashboard session: login, selected period and loaded tables.

use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use crate::padron::io_excel::read_voter_roll_excel;
use crate::padron::io_theta::{read_theta_estimates, read_theta_intervals, read_theta_samples};
use crate::padron::io_tsv::{read_polygons, read_voter_roll_tsv};
use crate::padron::*;

use voter_analytics::auth::{authenticate, AuthError, CredentialStore, StoredUser};
use voter_analytics::theta::{BootstrapSamples, ThetaIntervals, ThetaTable};
use voter_analytics::{Analysis, PolygonVertex, VoterRecord};

/// The pages of the dashboard.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum View {
    Introduction,
    KnownVoters,
    TurnoutByAge,
    ZoneMap,
    Theta,
}

impl View {
    pub const ALL: [View; 5] = [
        View::Introduction,
        View::KnownVoters,
        View::TurnoutByAge,
        View::ZoneMap,
        View::Theta,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            View::Introduction => "introduction",
            View::KnownVoters => "known-voters",
            View::TurnoutByAge => "turnout-by-age",
            View::ZoneMap => "zone-map",
            View::Theta => "theta",
        }
    }

    pub fn from_name(name: &str) -> Option<View> {
        View::ALL.iter().find(|v| v.name() == name).cloned()
    }

    pub fn requires_login(&self) -> bool {
        *self != View::Introduction
    }
}

/// The displays of the probability view.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ThetaMode {
    Heatmap,
    ByAgeGroup,
    ByParty,
    Overview,
}

impl ThetaMode {
    pub fn name(&self) -> &'static str {
        match self {
            ThetaMode::Heatmap => "heatmap",
            ThetaMode::ByAgeGroup => "by-age-group",
            ThetaMode::ByParty => "by-party",
            ThetaMode::Overview => "overview",
        }
    }

    pub fn from_name(name: &str) -> Option<ThetaMode> {
        [
            ThetaMode::Heatmap,
            ThetaMode::ByAgeGroup,
            ThetaMode::ByParty,
            ThetaMode::Overview,
        ]
        .into_iter()
        .find(|m| m.name() == name)
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ViewRequest {
    pub view: View,
    /// The period name. The first configured period when absent.
    pub period: Option<String>,
    pub theta_mode: ThetaMode,
    /// The age group or the party for the interval displays.
    pub selection: Option<String>,
}

/// A session over one configuration.
///
/// The input tables are read on first use and kept until logout.
pub struct Session<'c> {
    config: &'c DashboardConfig,
    root: PathBuf,
    user: Option<StoredUser>,
    auth_error: Option<String>,
    selected_period: Option<String>,
    voters: HashMap<String, Rc<Vec<VoterRecord>>>,
    vertices: Option<Rc<Vec<PolygonVertex>>>,
    theta_table: Option<Rc<ThetaTable>>,
    theta_intervals: Option<Rc<Analysis<ThetaIntervals>>>,
    theta_samples: Option<Rc<BootstrapSamples>>,
}

impl<'c> Session<'c> {
    pub fn new(config: &'c DashboardConfig, root: &Path) -> Session<'c> {
        Session {
            config,
            root: root.to_path_buf(),
            user: None,
            auth_error: None,
            selected_period: None,
            voters: HashMap::new(),
            vertices: None,
            theta_table: None,
            theta_intervals: None,
            theta_samples: None,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        self.config
    }

    pub fn login<S: CredentialStore + ?Sized>(
        &mut self,
        store: &S,
        username: &str,
        password: &str,
    ) -> Result<&StoredUser, AuthError> {
        self.logout();
        match authenticate(store, username, password, &self.config.salt()) {
            Ok(user) => Ok(&*self.user.insert(user)),
            Err(e) => {
                self.auth_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn logout(&mut self) {
        if let Some(u) = self.user.take() {
            info!("logout: user {}", u.name);
        }
        self.auth_error = None;
        self.selected_period = None;
        self.voters.clear();
        self.vertices = None;
        self.theta_table = None;
        self.theta_intervals = None;
        self.theta_samples = None;
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&StoredUser> {
        self.user.as_ref()
    }

    /// The message of the last failed login, if any.
    pub fn auth_error(&self) -> Option<&str> {
        self.auth_error.as_deref()
    }

    /// Selects a period by name, or keeps the current one (the first
    /// configured period initially) when no name is given.
    pub fn select_period(&mut self, name: Option<&str>) -> PadronResult<Period> {
        let name = name.or(self.selected_period.as_deref());
        let period = self.config.period(name)?.clone();
        self.selected_period = Some(period.name.clone());
        Ok(period)
    }

    fn path(&self, file_path: &str) -> String {
        self.config.resolve(&self.root, file_path)
    }

    pub fn voters(&mut self, period: &Period) -> PadronResult<Rc<Vec<VoterRecord>>> {
        if let Some(v) = self.voters.get(&period.name) {
            return Ok(v.clone());
        }
        let source = &self.config.voter_roll;
        let path = self.path(&source.file_path);
        let records = match source.provider.as_deref() {
            None | Some("tsv") => read_voter_roll_tsv(&path, source, period)?,
            Some("xlsx") => read_voter_roll_excel(&path, source, period)?,
            Some(x) => whatever!("Provider not implemented {:?}", x),
        };
        let res = Rc::new(records);
        self.voters.insert(period.name.clone(), res.clone());
        Ok(res)
    }

    pub fn vertices(&mut self) -> PadronResult<Rc<Vec<PolygonVertex>>> {
        if let Some(v) = &self.vertices {
            return Ok(v.clone());
        }
        let res = Rc::new(read_polygons(&self.path(&self.config.polygons.file_path))?);
        self.vertices = Some(res.clone());
        Ok(res)
    }

    pub fn theta_table(&mut self) -> PadronResult<Rc<ThetaTable>> {
        if let Some(t) = &self.theta_table {
            return Ok(t.clone());
        }
        let source = match &self.config.theta_estimates {
            Some(s) => s,
            None => whatever!("No probability estimates in the configuration"),
        };
        let res = Rc::new(read_theta_estimates(&self.path(&source.file_path))?);
        self.theta_table = Some(res.clone());
        Ok(res)
    }

    pub fn theta_intervals(&mut self) -> PadronResult<Rc<Analysis<ThetaIntervals>>> {
        if let Some(t) = &self.theta_intervals {
            return Ok(t.clone());
        }
        let source = match &self.config.theta_bootstrap {
            Some(s) => s,
            None => whatever!("No bootstrap summary in the configuration"),
        };
        let res = Rc::new(read_theta_intervals(&self.path(&source.file_path))?);
        self.theta_intervals = Some(res.clone());
        Ok(res)
    }

    /// The bootstrap replicates, when configured.
    pub fn theta_samples(&mut self) -> PadronResult<Option<Rc<BootstrapSamples>>> {
        if let Some(s) = &self.theta_samples {
            return Ok(Some(s.clone()));
        }
        let source = match &self.config.theta_samples {
            Some(s) => s.clone(),
            None => return Ok(None),
        };
        let table = self.theta_table()?;
        let res = Rc::new(read_theta_samples(&self.path(&source.file_path), &table)?);
        self.theta_samples = Some(res.clone());
        Ok(Some(res))
    }
}
