mod test_viewer_admission;
mod test_viewer_routing;
