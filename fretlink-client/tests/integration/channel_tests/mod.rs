mod test_fret_updates_reach_latest_slot;
