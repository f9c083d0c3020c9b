mod test_only_negotiation_is_relayed;
