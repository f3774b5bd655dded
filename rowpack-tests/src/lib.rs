// Integration tests for lib_rowpack live in the tests directory.
