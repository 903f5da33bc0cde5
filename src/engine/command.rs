//! Typed replication control commands
//!
//! Commands render to the administrative statements of a MySQL-compatible
//! engine. `Display` renders the same text with credentials masked and is
//! what goes into logs.

use std::fmt;

/// Replication control statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    /// Stop both replication threads on the default channel
    StopReplicationForChannel,
    /// Stop only the fetch (IO) thread on the default channel
    StopFetchThreadForChannel,
    /// Point replication at a new source
    ChangeSource {
        host: String,
        port: u16,
        user: String,
        password: String,
        auto_position: bool,
    },
    /// Start replication, applying everything strictly before `gtid`
    StartReplicationUntilBefore { gtid: String },
    /// Stop replication
    StopReplication,
    /// Forget the replication source entirely
    ResetReplicationAll,
}

impl EngineCommand {
    /// Statement text to send to the engine.
    pub fn to_sql(&self) -> String {
        self.render(false)
    }

    fn render(&self, redact: bool) -> String {
        match self {
            EngineCommand::StopReplicationForChannel => "STOP SLAVE FOR CHANNEL ''".to_string(),
            EngineCommand::StopFetchThreadForChannel => {
                "STOP SLAVE IO_THREAD FOR CHANNEL ''".to_string()
            }
            EngineCommand::ChangeSource {
                host,
                port,
                user,
                password,
                auto_position,
            } => {
                let mut sql = format!(
                    "CHANGE MASTER TO MASTER_HOST='{}', MASTER_PORT={}, MASTER_USER='{}'",
                    escape(host),
                    port,
                    escape(user)
                );
                if !password.is_empty() {
                    let shown = if redact { "****".to_string() } else { escape(password) };
                    sql.push_str(&format!(", MASTER_PASSWORD='{}'", shown));
                }
                if *auto_position {
                    sql.push_str(", MASTER_AUTO_POSITION = 1");
                }
                sql
            }
            EngineCommand::StartReplicationUntilBefore { gtid } => {
                format!("START SLAVE UNTIL SQL_BEFORE_GTIDS = '{}'", escape(gtid))
            }
            EngineCommand::StopReplication => "STOP SLAVE".to_string(),
            EngineCommand::ResetReplicationAll => "RESET SLAVE ALL".to_string(),
        }
    }
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(true))
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Stop and forget any existing replication source.
pub fn reset_replication_commands() -> Vec<EngineCommand> {
    vec![
        EngineCommand::StopReplication,
        EngineCommand::ResetReplicationAll,
    ]
}
