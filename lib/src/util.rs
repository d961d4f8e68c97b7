/// Elements that occupy a logical "width" when laid out in local variable slots or on the
/// operand stack
///
/// On the JVM, `long` and `double` values take up two slots while everything else takes up one.
pub trait Width {
    fn width(&self) -> usize;
}
