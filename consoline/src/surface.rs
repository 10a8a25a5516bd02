//! Terminal surface capability
//!
//! The editor writes text and escape sequences and asks for the surface
//! size; it never reads back from the surface.

use embedded_io::Error as _;

use crate::error::Error;

pub trait Surface {
    fn write(&mut self, text: &str) -> Result<(), Error>;

    fn flush(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn rows(&self) -> usize;

    fn cols(&self) -> usize;
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn write(&mut self, text: &str) -> Result<(), Error> {
        S::write(self, text)
    }

    fn flush(&mut self) -> Result<(), Error> {
        S::flush(self)
    }

    fn rows(&self) -> usize {
        S::rows(self)
    }

    fn cols(&self) -> usize {
        S::cols(self)
    }
}

/// Surface over any [`embedded_io::Write`]
pub struct IoSurface<W: embedded_io::Write> {
    output: W,
    rows: usize,
    cols: usize,
}

impl<W: embedded_io::Write> IoSurface<W> {
    pub fn new(output: W, rows: usize, cols: usize) -> Self {
        Self { output, rows, cols }
    }

    /// Record a new surface size, e.g. after SIGWINCH
    pub fn resize(&mut self, rows: usize, cols: usize) {
        self.rows = rows;
        self.cols = cols;
    }

    /// Consume wrapper and return the output
    pub fn take(self) -> W {
        self.output
    }
}

impl<W: embedded_io::Write> Surface for IoSurface<W> {
    fn write(&mut self, text: &str) -> Result<(), Error> {
        self.output
            .write_all(text.as_bytes())
            .map_err(|e| Error::write_error(e.kind()))
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.output
            .flush()
            .map_err(|e| Error::write_error(e.kind()))
    }

    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }
}

/// Swallows everything; used for hidden startup output
#[derive(Debug, Clone, Copy)]
pub struct DiscardSurface {
    rows: usize,
    cols: usize,
}

impl DiscardSurface {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }
}

impl Surface for DiscardSurface {
    fn write(&mut self, _: &str) -> Result<(), Error> {
        Ok(())
    }

    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }
}

/// Wrapper for std::io::Stdout
pub struct StdoutWrapper(std::io::Stdout);

impl StdoutWrapper {
    pub fn new() -> Self {
        Self(std::io::stdout())
    }
}

impl Default for StdoutWrapper {
    fn default() -> Self {
        Self::new()
    }
}

impl embedded_io::ErrorType for StdoutWrapper {
    type Error = embedded_io::ErrorKind;
}

impl embedded_io::Write for StdoutWrapper {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        use std::io::Write;

        self.0.write(buf).map_err(|e| e.kind().into())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        use std::io::Write;

        self.0.flush().map_err(|e| e.kind().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl embedded_io::ErrorType for Broken {
        type Error = embedded_io::ErrorKind;
    }

    impl embedded_io::Write for Broken {
        fn write(&mut self, _: &[u8]) -> Result<usize, Self::Error> {
            Err(embedded_io::ErrorKind::BrokenPipe)
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    struct Sink(Vec<u8>);

    impl embedded_io::ErrorType for Sink {
        type Error = embedded_io::ErrorKind;
    }

    impl embedded_io::Write for Sink {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn io_surface() {
        let mut surface = IoSurface::new(Sink(Vec::new()), 24, 80);

        surface.write("hello ").unwrap();
        surface.write("wørld").unwrap();
        surface.resize(10, 40);

        assert_eq!((surface.rows(), surface.cols()), (10, 40));
        assert_eq!(surface.take().0, "hello wørld".as_bytes());
    }

    #[test]
    fn write_failure() {
        let mut surface = IoSurface::new(Broken, 24, 80);

        assert!(matches!(
            surface.write("x"),
            Err(Error::Write(embedded_io::ErrorKind::BrokenPipe))
        ));
    }

    #[test]
    fn discard() {
        let mut surface = DiscardSurface::new(5, 20);
        let surface: &mut dyn Surface = &mut surface;

        assert!(surface.write("gone").is_ok());
        assert_eq!(surface.cols(), 20);
    }
}
