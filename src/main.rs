use mazerun::app::App;

/// Log to a file when MAZERUN_LOG is set; the terminal itself is in raw mode
/// and belongs to the renderer. The guard must stay alive for the duration of
/// the program so buffered log lines get flushed.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    if std::env::var_os("MAZERUN_LOG").is_none() {
        return None;
    }
    let file_appender = tracing_appender::rolling::never(".", "mazerun.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();
    Some(guard)
}

fn main() -> std::io::Result<()> {
    let _log_guard = init_tracing();

    // Optional HEIGHT WIDTH arguments; otherwise fit the terminal
    let mut args = std::env::args().skip(1);
    let parsed = (args.next(), args.next());
    let (height, width) = match parsed {
        (Some(h), Some(w)) => match (h.parse::<u16>(), w.parse::<u16>()) {
            (Ok(h), Ok(w)) if h > 0 && w > 0 => (h, w),
            _ => {
                eprintln!("Usage: mazerun [HEIGHT WIDTH] (both positive, odd works best)");
                return Ok(());
            }
        },
        (Some(_), None) => {
            eprintln!("Usage: mazerun [HEIGHT WIDTH] (both positive, odd works best)");
            return Ok(());
        }
        _ => App::default_dimensions(),
    };

    let mut stdout = std::io::stdout();
    App::setup_terminal(&mut stdout)?;
    let result = App::default().run(height, width);
    App::restore_terminal(&mut stdout)?;
    result
}
