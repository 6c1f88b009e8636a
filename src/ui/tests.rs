//! Tests for the command-line interface

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::jellyfin::MediaItem;

    fn test_args() -> Args {
        Args {
            server_url: None,
            api_key: None,
            username: None,
            password: None,
            parent_id: None,
            config: None,
        }
    }

    fn test_item(id: &str, name: &str, media_type: &str, is_folder: bool) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            name: name.to_string(),
            media_type: media_type.to_string(),
            is_folder,
            run_time_ticks: None,
            series_id: None,
            series_name: None,
            parent_index_number: None,
            index_number: None,
            media_sources: Vec::new(),
            user_data: None,
        }
    }

    #[test]
    fn test_args_parsing() {
        use clap::CommandFactory;
        let app = Args::command();
        app.debug_assert();
    }

    #[test]
    fn test_display_items() {
        let cli = Cli { args: test_args() };

        let items = vec![
            test_item("item1", "Test Item 1", "Audio", false),
            test_item("item2", "Test Item 2", "Folder", true),
        ];

        cli.display_items(&items);
    }

    #[test]
    fn test_display_error() {
        let cli = Cli { args: test_args() };

        let error = std::io::Error::new(std::io::ErrorKind::Other, "Test error");
        cli.display_error(&error);
    }
}
