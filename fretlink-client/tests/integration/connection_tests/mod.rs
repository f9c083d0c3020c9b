mod test_controller_reaches_channel_open;
mod test_invalid_token_closes_session;
mod test_performer_buffers_early_candidates;
