use std::collections::{BTreeMap, HashSet};

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::host::{ChannelHost, ChannelKind, ChannelRef, HostError, MessageRef};
use crate::throttle::DeletePacer;

/// Marker appended to a channel name once its content is ready.
pub const DONE_MARK: char = '✅';

/// Characters trimmed around the marker when rewriting a name.
const NAME_SEPARATORS: &[char] = &['-', '_', ' '];

/// The platform refuses to bulk-delete messages older than this.
const BULK_MAX_AGE_DAYS: i64 = 14;

/// A bulk-delete call needs at least this many IDs; a lone leftover goes
/// through the fallback sweep instead.
const BULK_MIN: usize = 2;

const PAGE_SIZE: u8 = 100;

/// Immutable channel grouping handed to the engine at construction.
#[derive(Debug, Clone, Default)]
pub struct ChannelGroups {
    /// Hard-cleared on every reset, pins included.
    pub special: Vec<u64>,
    /// Week key to channel IDs, cleared per selector.
    pub weeks: BTreeMap<String, Vec<u64>>,
    /// Whether week-group purges leave pinned messages in place.
    pub keep_pinned: bool,
}

impl ChannelGroups {
    pub fn has_week(&self, key: &str) -> bool {
        self.weeks.contains_key(key)
    }

    /// Channel IDs targeted by a scope, order-stable and deduplicated.
    fn target_ids(&self, scope: &ResetScope) -> Vec<u64> {
        let groups: Vec<&Vec<u64>> = match scope {
            ResetScope::Week(key) => self.weeks.get(key).into_iter().collect(),
            ResetScope::All => self.weeks.values().collect(),
        };

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for ids in groups {
            for &id in ids {
                if seen.insert(id) {
                    out.push(id);
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetScope {
    Week(String),
    All,
}

impl ResetScope {
    pub fn parse(selector: &str) -> Self {
        match selector.trim() {
            "" | "all" => Self::All,
            week => Self::Week(week.to_string()),
        }
    }
}

/// Outcome of one best-effort rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpStatus {
    Applied,
    /// Already in the desired state; no call issued.
    Unchanged,
    Denied,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PurgeStatus {
    Completed,
    /// History paging was denied; the sweep stopped for this channel only.
    AccessDenied,
    /// History paging failed mid-sweep for a non-permission reason.
    Interrupted,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurgeReport {
    pub status: PurgeStatus,
    pub bulk_deleted: usize,
    pub swept: usize,
    /// Messages whose individual delete failed and was skipped.
    pub skipped: usize,
}

impl PurgeReport {
    pub fn deleted(&self) -> usize {
        self.bulk_deleted + self.swept
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelReport {
    pub channel_id: u64,
    pub name: String,
    /// Marker-strip outcome; `None` for special channels, which keep their names.
    pub marker: Option<OpStatus>,
    pub purge: PurgeReport,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResetReport {
    pub channels: Vec<ChannelReport>,
}

impl ResetReport {
    pub fn total_deleted(&self) -> usize {
        self.channels.iter().map(|c| c.purge.deleted()).sum()
    }
}

/// Name with the done marker appended, normalized. `None` when the marker is
/// already present or nothing would change.
pub fn name_with_mark(name: &str) -> Option<String> {
    if name.contains(DONE_MARK) {
        return None;
    }
    let base = name.trim_end_matches(NAME_SEPARATORS);
    let marked = format!("{base}-{DONE_MARK}")
        .replace(' ', "-")
        .to_lowercase();
    (marked != name).then_some(marked)
}

/// Name with every marker removed, normalized. `None` when no marker is
/// present, or the result would be empty or unchanged.
pub fn name_without_mark(name: &str) -> Option<String> {
    if !name.contains(DONE_MARK) {
        return None;
    }
    let stripped: String = name.chars().filter(|c| *c != DONE_MARK).collect();
    let stripped = stripped
        .trim_matches(NAME_SEPARATORS)
        .replace(' ', "-")
        .to_lowercase();
    (!stripped.is_empty() && stripped != name).then_some(stripped)
}

/// Resolves configured IDs to live text channels, in input order. Misses and
/// lookup failures are dropped: channel sets are static configuration that
/// may drift from the live guild.
pub async fn resolve_channels<H: ChannelHost>(host: &H, ids: &[u64]) -> Vec<ChannelRef> {
    let mut out = Vec::new();
    for &id in ids {
        match host.channel(id).await {
            Ok(Some(channel)) if channel.kind == ChannelKind::Text => out.push(channel),
            Ok(Some(channel)) => {
                debug!(channel = id, kind = ?channel.kind, "skipping non-text channel");
            }
            Ok(None) => debug!(channel = id, "channel not in workspace, skipping"),
            Err(err) => debug!(channel = id, error = %err, "channel lookup failed, skipping"),
        }
    }
    out
}

fn deletable(message: &MessageRef, keep_pinned: bool) -> bool {
    !(keep_pinned && message.pinned)
}

async fn apply_rename<H: ChannelHost>(
    host: &H,
    channel: &ChannelRef,
    target: Option<String>,
) -> OpStatus {
    let Some(name) = target else {
        return OpStatus::Unchanged;
    };
    match host.rename(channel.id, &name).await {
        Ok(()) => OpStatus::Applied,
        Err(HostError::Forbidden) => {
            warn!(channel = channel.id, "rename denied");
            OpStatus::Denied
        }
        Err(err) => {
            warn!(channel = channel.id, error = %err, "rename failed");
            OpStatus::Failed
        }
    }
}

/// Empties a channel's history, keeping pinned messages when asked. Bulk
/// deletion first for recent messages, then a paced single-delete sweep for
/// whatever the bulk path could not remove. Never fails; partial progress is
/// reported, not raised.
pub async fn purge_channel<H: ChannelHost>(
    host: &H,
    pacer: &DeletePacer,
    channel: &ChannelRef,
    keep_pinned: bool,
) -> PurgeReport {
    let bulk_deleted = bulk_phase(host, channel, keep_pinned).await;
    let (status, swept, skipped) = sweep_phase(host, pacer, channel, keep_pinned).await;
    PurgeReport {
        status,
        bulk_deleted,
        swept,
        skipped,
    }
}

async fn bulk_phase<H: ChannelHost>(host: &H, channel: &ChannelRef, keep_pinned: bool) -> usize {
    let cutoff = Utc::now() - Duration::days(BULK_MAX_AGE_DAYS);
    let mut deleted = 0;
    let mut cursor = None;

    loop {
        let page = match host.messages_before(channel.id, cursor, PAGE_SIZE).await {
            Ok(page) => page,
            Err(err) => {
                debug!(channel = channel.id, error = %err, "bulk phase ended on history error");
                break;
            }
        };
        if page.is_empty() {
            break;
        }
        cursor = page.last().map(|m| m.id);

        // Pages run newest to oldest: once one message crosses the age
        // ceiling, everything beyond it belongs to the sweep.
        let reached_ceiling = page.iter().any(|m| m.sent_at <= cutoff);
        let batch: Vec<u64> = page
            .iter()
            .filter(|m| deletable(m, keep_pinned) && m.sent_at > cutoff)
            .map(|m| m.id)
            .collect();

        if batch.len() >= BULK_MIN {
            match host.bulk_delete(channel.id, &batch).await {
                Ok(()) => deleted += batch.len(),
                Err(err) => {
                    debug!(channel = channel.id, error = %err, "bulk delete refused");
                    break;
                }
            }
        }

        if reached_ceiling {
            break;
        }
    }
    deleted
}

async fn sweep_phase<H: ChannelHost>(
    host: &H,
    pacer: &DeletePacer,
    channel: &ChannelRef,
    keep_pinned: bool,
) -> (PurgeStatus, usize, usize) {
    let mut swept = 0;
    let mut skipped = 0;
    let mut cursor = None;

    loop {
        let page = match host.messages_before(channel.id, cursor, PAGE_SIZE).await {
            Ok(page) => page,
            Err(HostError::Forbidden) => {
                warn!(channel = channel.id, "history access denied, sweep aborted");
                return (PurgeStatus::AccessDenied, swept, skipped);
            }
            Err(err) => {
                warn!(channel = channel.id, error = %err, "history paging failed, sweep interrupted");
                return (PurgeStatus::Interrupted, swept, skipped);
            }
        };
        if page.is_empty() {
            break;
        }
        cursor = page.last().map(|m| m.id);

        for message in &page {
            if !deletable(message, keep_pinned) {
                continue;
            }
            pacer.acquire().await;
            match host.delete_message(channel.id, message.id).await {
                Ok(()) => swept += 1,
                Err(err) => {
                    debug!(
                        channel = channel.id,
                        message = message.id,
                        error = %err,
                        "delete skipped"
                    );
                    skipped += 1;
                }
            }
        }
    }
    (PurgeStatus::Completed, swept, skipped)
}

/// Group-level reset workflow. Strictly sequential: the shared rate budget
/// and the rename-then-purge ordering both rule out parallelism.
pub struct ResetEngine<H> {
    host: H,
    groups: ChannelGroups,
    pacer: DeletePacer,
}

impl<H: ChannelHost> ResetEngine<H> {
    pub fn new(host: H, groups: ChannelGroups) -> Self {
        Self {
            host,
            groups,
            pacer: DeletePacer::default(),
        }
    }

    pub fn groups(&self) -> &ChannelGroups {
        &self.groups
    }

    /// Runs one reset: hard-clear the special group, then strip the marker
    /// and purge the selected week group(s). Every channel is processed to
    /// completion or recorded failure; nothing aborts the request.
    pub async fn run(&self, scope: &ResetScope) -> ResetReport {
        let mut report = ResetReport::default();

        for channel in resolve_channels(&self.host, &self.groups.special).await {
            let purge = purge_channel(&self.host, &self.pacer, &channel, false).await;
            report.channels.push(ChannelReport {
                channel_id: channel.id,
                name: channel.name,
                marker: None,
                purge,
            });
        }

        let targets = self.groups.target_ids(scope);
        for channel in resolve_channels(&self.host, &targets).await {
            let marker =
                apply_rename(&self.host, &channel, name_without_mark(&channel.name)).await;
            let purge =
                purge_channel(&self.host, &self.pacer, &channel, self.groups.keep_pinned).await;
            report.channels.push(ChannelReport {
                channel_id: channel.id,
                name: channel.name,
                marker: Some(marker),
                purge,
            });
        }

        report
    }

    /// Adds the done marker to a single channel's name. `None` when the ID
    /// does not resolve to a text channel.
    pub async fn mark_channel(&self, id: u64) -> Option<OpStatus> {
        let channel = resolve_channels(&self.host, &[id]).await.into_iter().next()?;
        Some(apply_rename(&self.host, &channel, name_with_mark(&channel.name)).await)
    }

    /// Removes the done marker from a single channel's name.
    pub async fn unmark_channel(&self, id: u64) -> Option<OpStatus> {
        let channel = resolve_channels(&self.host, &[id]).await.into_iter().next()?;
        Some(apply_rename(&self.host, &channel, name_without_mark(&channel.name)).await)
    }
}
