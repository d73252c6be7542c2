//! Method descriptor helpers

/// Number of local variable slots taken by the parameters of a method
/// descriptor such as `(IJ[Ljava/lang/String;)V`. `long` and `double` take two.
pub fn argument_slots(descriptor: &str) -> u16 {
    let params = match descriptor.strip_prefix('(').and_then(|rest| rest.split(')').next()) {
        Some(params) => params,
        None => return 0,
    };
    let mut slots = 0u16;
    let mut chars = params.chars();
    while let Some(c) = chars.next() {
        match c {
            'J' | 'D' => slots += 2,
            'L' => {
                for c in chars.by_ref() {
                    if c == ';' {
                        break;
                    }
                }
                slots += 1;
            }
            '[' => {
                let mut element = chars.next();
                while element == Some('[') {
                    element = chars.next();
                }
                if element == Some('L') {
                    for c in chars.by_ref() {
                        if c == ';' {
                            break;
                        }
                    }
                }
                slots += 1;
            }
            _ => slots += 1,
        }
    }
    slots
}
