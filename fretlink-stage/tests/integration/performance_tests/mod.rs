mod test_early_strums_are_credited;
mod test_on_beat_strums_clear_the_song;
