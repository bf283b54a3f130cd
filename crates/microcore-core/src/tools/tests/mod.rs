mod builtin_tests;
