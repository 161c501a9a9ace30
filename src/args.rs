use clap::Parser;

/// Voter-roll analytics: turnout, zone map and vote-probability summaries.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The JSON configuration of the dashboard: location of the voter roll, the zone polygons,
    /// the probability tables and the credential store. See the manual of voter_analytics for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (default introduction) The view to compute: introduction, known-voters, turnout-by-age, zone-map or theta.
    #[clap(long, value_parser)]
    pub view: Option<String>,

    /// (name, optional) The voting period, as named in the configuration. Defaults to the first period.
    #[clap(short, long, value_parser)]
    pub period: Option<String>,

    /// (optional) The user name. All the views except the introduction require a login.
    #[clap(short, long, value_parser)]
    pub user: Option<String>,

    /// (optional) The password of the user.
    #[clap(long, value_parser)]
    pub password: Option<String>,

    /// (default heatmap) For the theta view: heatmap, by-age-group, by-party or overview.
    #[clap(long, value_parser)]
    pub theta_mode: Option<String>,

    /// (optional) For the theta view: the age group or the party to display. Defaults to the first one.
    #[clap(long, value_parser)]
    pub select: Option<String>,

    /// (file path, 'stdout' or empty) Where to write the JSON summary of the view.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the expected JSON summary. If provided, padron will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
