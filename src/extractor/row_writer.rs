use std::io::{self, Write};

/// Writes values as comma-terminated fields, ending a row after every
/// `values_per_row` values. A partial last row is left open.
pub struct RowWriter<W: Write> {
    inner: W,
    values_per_row: usize,
    values_written: usize,
}

impl<W: Write> RowWriter<W> {
    pub fn new(inner: W, values_per_row: usize) -> Self {
        Self {
            inner,
            // A zero-width row would never terminate.
            values_per_row: values_per_row.max(1),
            values_written: 0,
        }
    }

    pub fn push(&mut self, value: &str) -> io::Result<()> {
        write!(self.inner, "{},", value)?;
        self.values_written += 1;

        if self.values_written % self.values_per_row == 0 {
            writeln!(self.inner)?;
        }

        Ok(())
    }

    pub fn values_written(&self) -> usize {
        self.values_written
    }

    pub fn rows_completed(&self) -> usize {
        self.values_written / self.values_per_row
    }

    /// Values in the unterminated last row.
    pub fn trailing_values(&self) -> usize {
        self.values_written % self.values_per_row
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Renders values into the row format in one go.
pub fn format_rows<'a, I>(values: I, values_per_row: usize) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut writer = RowWriter::new(Vec::new(), values_per_row);
    for value in values {
        // Writes into a Vec cannot fail.
        let _ = writer.push(value);
    }
    String::from_utf8(writer.inner).unwrap_or_default()
}
