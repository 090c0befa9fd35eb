use super::*;

impl<'c> Settlement<'c> {
    /// Elects a principle within a group, or unsets the group entirely when
    /// `election` is `None`. A group holds at most one active option; a new
    /// election deselects the previous one and moves its survivor attribute
    /// deltas along with it. Re-electing the active option is a no-op.
    pub fn set_principle(
        &mut self,
        group_handle: &str,
        election: Option<&str>,
    ) -> Result<bool, SettlementError> {
        let group = self.content.principle_group(group_handle)?.clone();

        let Some(election) = election else {
            let mut removed = false;
            for option in &group.option_handles {
                if self.doc.principles.contains(option) {
                    self.remove_principle(option)?;
                    removed = true;
                }
            }
            if removed {
                let group_name = group.name.clone();
                self.log_event("set_principle", format!("Unset settlement {group_name} principle."));
                self.dirty = true;
            }
            return Ok(removed);
        };

        if !group.option_handles.iter().any(|option| option == election) {
            return Err(SettlementError::Validation(format!(
                "'{election}' is not an option of the '{}' principle",
                group.handle
            )));
        }
        let elected = self.content.innovations.require(election)?.clone();

        if self.doc.principles.iter().any(|p| p == election) {
            warn!(settlement = %self.doc.id, election, "ignoring duplicate principle election");
            return Ok(false);
        }

        for option in &group.option_handles {
            if self.doc.principles.contains(option) {
                self.remove_principle(option)?;
            }
        }

        self.doc.principles.push(election.to_string());
        self.log_event(
            "set_principle",
            format!("Set settlement {} principle to {}", group.name, elected.name),
        );
        if !elected.current_survivor.is_empty() {
            self.update_all_survivors(AttributeOp::Increment, &elected.current_survivor);
        }
        self.dirty = true;
        Ok(true)
    }

    /// Deselects one active principle option and reverts its survivor
    /// attribute deltas.
    fn remove_principle(&mut self, handle: &str) -> Result<(), SettlementError> {
        let asset = self.content.innovations.require(handle)?.clone();
        self.doc.principles.retain(|p| p != handle);
        if !asset.current_survivor.is_empty() {
            self.update_all_survivors(AttributeOp::Decrement, &asset.current_survivor);
        }
        Ok(())
    }

    /// Applies an attribute delta map to every survivor, sequentially.
    pub fn update_all_survivors(&mut self, op: AttributeOp, attributes: &BTreeMap<String, i64>) {
        for survivor in &mut self.survivors {
            for (attribute, delta) in attributes {
                let signed = match op {
                    AttributeOp::Increment => *delta,
                    AttributeOp::Decrement => -*delta,
                };
                survivor.update_attribute(attribute, signed);
            }
        }
        self.dirty = true;
    }
}
