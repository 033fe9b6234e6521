use std::{
    io,
    sync::Mutex,
    thread,
    time::Duration,
};

use crossbeam_channel::{select, tick};

use super::backspace;

pub(crate) const FRAMES: [char; 4] = ['|', '/', '-', '\\'];

/// Run `f` while a ticker thread paints spinner frames onto `target`.
///
/// Each tick writes the next frame and moves the cursor back by one column, so
/// the frames rotate in place. Ticks are best effort: a frame that cannot grab
/// the target or fails to write is simply skipped. The ticker is stopped before
/// this function returns.
pub(crate) fn spin<W, R>(target: &Mutex<W>, interval: Duration, f: impl FnOnce() -> R) -> R
where
    W: io::Write + Send,
{
    let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);
    thread::scope(|scope| {
        scope.spawn(move || {
            let ticker = tick(interval);
            for frame in FRAMES.iter().cycle() {
                let stopped = select! {
                    recv(stop_rx) -> _ => true,
                    recv(ticker) -> _ => false,
                };
                if stopped {
                    break;
                }

                let Ok(mut target) = target.try_lock() else {
                    continue;
                };
                let _ = write!(target, "{frame}{}", backspace(1));
                let _ = target.flush();
            }
        });

        let result = f();
        drop(stop_tx);
        result
    })
}
