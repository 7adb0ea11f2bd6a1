use sketchboard::logger;
use std::fs;

use test_utils::temp_dir;

// Logger state is process-wide, so everything runs in one test
#[test]
fn test_log_records_reach_the_board_logger() {
    let dir = temp_dir();
    let path = dir.path().join("board.log");

    logger::init().expect("logger should install");
    logger::set_log_file(path.to_str().expect("utf-8 path")).expect("log file should open");

    log::debug!(target: "sketchboard::board", "before enabling");
    logger::enable_logging();
    log::debug!(target: "sketchboard::board", "hello board");
    log::debug!(target: "hyper::client", "pool chatter");
    log::trace!(target: "sketchboard::board", "too fine");

    logger::set_verbose_logging(true);
    log::debug!(target: "hyper::client", "verbose chatter");
    logger::set_verbose_logging(false);

    logger::disable_logging();
    log::debug!(target: "sketchboard::board", "after disabling");

    let written = fs::read_to_string(&path).expect("log file should be readable");
    assert!(written.contains("DEBUG [sketchboard::board] hello board"));
    assert!(written.contains("[hyper::client] verbose chatter"));
    assert!(!written.contains("pool chatter"));
    assert!(!written.contains("too fine"));
    assert!(!written.contains("before enabling"));
    assert!(!written.contains("after disabling"));
}
