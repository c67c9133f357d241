use std::{future::Future, sync::Mutex};

use itertools::Itertools;

use crate::{
    controls::Controls,
    heap::HeapStore,
    presentation::{Highlight, Presentation},
};

/// Delay scale for moving two nodes past each other.
const TWEEN: f64 = 0.5;

fn marker(highlight: Highlight) -> char {
    match highlight {
        Highlight::Active => '>',
        Highlight::Comparing => '?',
        Highlight::Swapping => '!',
        Highlight::Settled => '.',
        Highlight::Sorted => '#',
        Highlight::Selected => '^',
        Highlight::Plain => ' ',
    }
}

struct Screen {
    values: Vec<u32>,
    size: usize,
    marks: Vec<Highlight>,
}

impl Screen {
    fn render(&self) -> String {
        let mut lines = Vec::new();
        let mut first = 1;
        while first <= self.values.len() {
            let last = (2 * first - 1).min(self.values.len());
            let row = (first..=last)
                .map(|i| {
                    let mark = if i > self.size {
                        marker(Highlight::Sorted)
                    } else {
                        marker(self.marks[i])
                    };
                    format!("{:02}{}", self.values[i - 1], mark)
                })
                .join(" ");
            lines.push(row);
            first *= 2;
        }
        let width = lines.last().map(|l| l.len()).unwrap_or(0);
        lines
            .into_iter()
            .map(|l| format!("{:^width$}", l, width = width))
            .join("\n")
    }
}

/// Draws the heap as rows of a tree on stdout, one row per level.
///
/// Each value carries a marker for its highlight: `>` active, `?`
/// comparing, `!` swapping, `.` settled, `#` out of the heap, `^` picked.
pub struct TerminalView {
    controls: Controls,
    screen: Mutex<Screen>,
}

impl TerminalView {
    pub fn new(controls: Controls) -> TerminalView {
        TerminalView {
            controls,
            screen: Mutex::new(Screen {
                values: Vec::new(),
                size: 0,
                marks: Vec::new(),
            }),
        }
    }

    fn draw(&self, screen: &Screen) {
        println!("{}\n", screen.render());
    }
}

impl Presentation for TerminalView {
    fn highlight(&self, indices: &[usize], highlight: Highlight) {
        if let Ok(mut screen) = self.screen.lock() {
            for i in indices {
                if let Some(mark) = screen.marks.get_mut(*i) {
                    *mark = highlight;
                }
            }
            self.draw(&screen);
        }
    }

    fn animate_swap(&self, i: usize, j: usize) -> impl Future<Output = ()> + Send {
        log::debug!("swapping {} and {}", i, j);
        let delay = self.controls.delay(TWEEN);
        async move { tokio::time::sleep(delay).await }
    }

    fn notify(&self, message: &str) {
        println!(">>> {}", message);
    }

    fn refresh(&self, heap: &HeapStore) {
        if let Ok(mut screen) = self.screen.lock() {
            screen.values = heap.values().to_vec();
            screen.size = heap.len();
            if screen.marks.len() != heap.capacity() + 1 {
                screen.marks = vec![Highlight::Plain; heap.capacity() + 1];
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    TogglePause,
    Speed(f64),
    Stop,
    Select(usize),
}

/// Parse one line of user input: `p`, `s <factor>`, `q` or a node index.
pub fn parse_command(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let first = words.next()?;
    match first {
        "p" | "pause" | "resume" => Some(Command::TogglePause),
        "q" | "quit" | "stop" => Some(Command::Stop),
        "s" | "speed" => words.next()?.parse().ok().map(Command::Speed),
        _ => first.parse().ok().map(Command::Select),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn commands() {
        assert_eq!(parse_command("p"), Some(Command::TogglePause));
        assert_eq!(parse_command(" resume "), Some(Command::TogglePause));
        assert_eq!(parse_command("s 2.5"), Some(Command::Speed(2.5)));
        assert_eq!(parse_command("speed"), None);
        assert_eq!(parse_command("q"), Some(Command::Stop));
        assert_eq!(parse_command("12"), Some(Command::Select(12)));
        assert_eq!(parse_command("twelve"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn renders_rows() {
        let controls = Controls::new(Duration::from_millis(10), 1.0).unwrap();
        let view = TerminalView::new(controls);
        let mut heap = HeapStore::new(vec![1, 22, 3, 44, 5]);
        heap.detach();
        view.refresh(&heap);
        view.highlight(&[2], Highlight::Comparing);
        let screen = view.screen.lock().unwrap();
        let text = screen.render();
        let rows: Vec<&str> = text.lines().map(|l| l.trim()).collect();
        assert_eq!(rows, vec!["01", "22? 03", "44  05#"]);
    }
}
