use super::*;

impl<'c> Settlement<'c> {
    /// Index of the bucket for `ly`. The timeline is dense and sorted, so a
    /// missing year means the document structure is broken.
    pub(crate) fn find_year(&self, ly: u64) -> Result<usize, SettlementError> {
        self.doc
            .timeline
            .iter()
            .position(|entry| entry.year == ly)
            .ok_or_else(|| {
                SettlementError::TimelineConsistency(format!("lantern year {ly} is not in the timeline"))
            })
    }

    /// Schedules an event. Duplicate records and excluded-campaign events
    /// are logged no-ops; a missing year is an error.
    pub fn add_timeline_event(&mut self, event: &TimelineEvent) -> Result<bool, SettlementError> {
        if event.excluded_campaign.as_deref() == Some(self.doc.campaign.as_str()) {
            warn!(settlement = %self.doc.id, %event, "ignoring event excluded for this campaign");
            return Ok(false);
        }

        let index = self.find_year(event.ly)?;

        // Story events carry only a handle; enrich the record with the
        // catalog name so removal-by-name keeps working.
        let mut record = event.record();
        if event.kind == "story_event" {
            if let Some(handle) = event.handle.as_deref() {
                if let Some(asset) = self.content.events.get_asset(handle) {
                    record.name = Some(asset.name.clone());
                }
            }
        }

        let bucket = self.doc.timeline[index]
            .events
            .entry(event.kind.clone())
            .or_default();
        if bucket.contains(&record) {
            warn!(settlement = %self.doc.id, %event, "ignoring duplicate timeline event");
            return Ok(false);
        }
        bucket.push(record);

        let label = event
            .name
            .as_deref()
            .or(event.handle.as_deref())
            .unwrap_or("<unnamed>")
            .to_string();
        let ly = event.ly;
        self.log_event("add_timeline_event", format!("Added '{label}' to Lantern Year {ly}"));
        self.dirty = true;
        Ok(true)
    }

    /// Removes the first record in the year bucket matching by name or
    /// handle. No match is an error and the timeline is left untouched.
    pub fn rm_timeline_event(&mut self, event: &TimelineEvent) -> Result<bool, SettlementError> {
        if event.excluded_campaign.as_deref() == Some(self.doc.campaign.as_str()) {
            warn!(settlement = %self.doc.id, %event, "ignoring event excluded for this campaign");
            return Ok(false);
        }

        let index = self.find_year(event.ly)?;
        let target = event.record();

        let position = self.doc.timeline[index]
            .events
            .get(&event.kind)
            .and_then(|bucket| bucket.iter().position(|record| record.matches(&target)));

        let Some(position) = position else {
            return Err(SettlementError::TimelineConsistency(format!(
                "no matching {event} in the timeline"
            )));
        };

        let bucket = self.doc.timeline[index]
            .events
            .get_mut(&event.kind)
            .ok_or_else(|| {
                SettlementError::TimelineConsistency(format!("no {} bucket in year {}", event.kind, event.ly))
            })?;
        bucket.remove(position);

        let label = event
            .name
            .as_deref()
            .or(event.handle.as_deref())
            .unwrap_or("<unnamed>")
            .to_string();
        let ly = event.ly;
        self.log_event("rm_timeline_event", format!("Removed '{label}' from Lantern Year {ly}"));
        self.dirty = true;
        Ok(true)
    }

    /// Rebuilds the timeline from the campaign template, resolving story
    /// and settlement event handles against the events library. Unknown
    /// handles are fatal; this only runs at creation time.
    pub(crate) fn initialize_timeline(&mut self) -> Result<(), SettlementError> {
        let template = self.campaign()?.timeline.clone();

        let mut timeline = Vec::with_capacity(template.len());
        for year_entry in template {
            let mut entry = YearEntry::new(year_entry.year);
            for (tag, records) in year_entry.events {
                let mut resolved = Vec::with_capacity(records.len());
                for mut record in records {
                    if let Some(handle) = record.handle.as_deref() {
                        let asset = self.content.events.require(handle)?;
                        record.name = Some(asset.name.clone());
                    }
                    resolved.push(record);
                }
                entry.events.insert(tag, resolved);
            }
            timeline.push(entry);
        }

        timeline.sort_by_key(|entry| entry.year);
        self.doc.timeline = timeline;
        self.dirty = true;
        info!(settlement = %self.doc.id, "initialized timeline");
        Ok(())
    }
}
