mod test_relay_service;
